//! # OxiArc Meta
//!
//! Locatable meta blocks embedded in DEFLATE (RFC 1951) streams.
//!
//! A meta block carries up to 31 bytes of data in the code length
//! description of a dynamic Huffman block. Any compliant inflater decodes a
//! meta block to nothing, so meta blocks can be mixed freely with ordinary
//! compressed blocks. Every block ends with the four bytes `00 00 FF FF`,
//! which lets a scanner find the last block from the tail of a buffer
//! without decoding the stream from the start.
//!
//! ## Features
//!
//! - **Block codec**: [`encode_block`] / [`decode_block`] for single blocks
//! - **Streaming**: [`MetaWriter`] batches bytes into blocks,
//!   [`MetaReader`] reads them back
//! - **Reverse scanning**: [`reverse_search`] and [`reverse_blocks`] locate
//!   verified blocks from the end of a buffer
//!
//! ## Example
//!
//! ```rust
//! use oxiarc_meta::{LastMode, MetaReader, MetaWriter, reverse_search};
//! use std::io::Read;
//!
//! let mut writer = MetaWriter::new(Vec::new());
//! writer.write(b"sync point").unwrap();
//! writer.flush_block(LastMode::Continuation).unwrap();
//! writer.write(b"more").unwrap();
//! writer.close().unwrap();
//! let encoded = writer.into_inner();
//!
//! // Forward decoding.
//! let mut out = Vec::new();
//! MetaReader::new(&encoded[..]).read_to_end(&mut out).unwrap();
//! assert_eq!(out, b"sync pointmore");
//!
//! // The last block starts right after the first one.
//! let first = reverse_search(&encoded).unwrap();
//! assert_eq!(reverse_search(&encoded[..first]), Some(0));
//! ```
//!
//! ## Block modes
//!
//! - [`LastMode::Continuation`]: more blocks follow
//! - [`LastMode::EndOfMetaSegment`]: the meta segment ends, ordinary
//!   DEFLATE blocks may follow
//! - [`LastMode::EndOfStream`]: the DEFLATE stream ends (BFINAL is set)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod config;
pub mod huffman;
pub mod reader;
pub mod scanner;
pub mod tables;
pub mod types;
pub mod writer;

// Re-exports
pub use block::{DecodedBlock, decode_block, decode_slice, encodable_prefix, encode_block};
pub use config::MetaConfig;
pub use huffman::{HuffLengths, compute_lengths};
pub use reader::MetaReader;
pub use scanner::{LocatedBlock, ReverseBlocks, reverse_blocks, reverse_locate, reverse_search};
pub use tables::{
    ENSURE_RAW_BYTES, MAGIC, MAX_ENC_BYTES, MAX_RAW_BYTES, MIN_ENC_BYTES, MIN_RAW_BYTES,
};
pub use types::{LastMode, StreamStats};
pub use writer::MetaWriter;

pub use oxiarc_core::{OxiArcError, Result};
