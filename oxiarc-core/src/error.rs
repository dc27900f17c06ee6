//! Error types for OxiArc operations.
//!
//! Errors fall into three families plus I/O:
//!
//! - **size** errors: a chunk cannot be encoded as a single block
//! - **format** errors: malformed, corrupt or truncated block data
//! - **closed** errors: an operation on a writer or reader after `close()`
//!
//! Rejected configuration values get their own variant.

use std::io;
use thiserror::Error;

/// The main error type for OxiArc operations.
#[derive(Debug, Error)]
pub enum OxiArcError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Chunk is longer than any block can carry.
    #[error("Chunk too large: {size} bytes exceeds maximum {max}")]
    ChunkTooLarge {
        /// Length of the rejected chunk.
        size: usize,
        /// Maximum chunk length.
        max: usize,
    },

    /// No valid code-length assignment exists for this bit population.
    #[error("Chunk not encodable: no code lengths for {zeros} zero bits and {ones} one bits")]
    Unencodable {
        /// Number of 0-bits in the chunk.
        zeros: usize,
        /// Number of 1-bits in the chunk.
        ones: usize,
    },

    /// Invalid block header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Corrupted data in a block.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset (within the block) where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Unexpected end of file.
    #[error("Unexpected end of file: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Operation on a closed writer or reader.
    #[error("Stream is closed")]
    Closed,

    /// Configuration value out of range.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the rejected value.
        message: String,
    },
}

/// Result type alias for OxiArc operations.
pub type Result<T> = std::result::Result<T, OxiArcError>;

impl OxiArcError {
    /// Create a chunk too large error.
    pub fn chunk_too_large(size: usize, max: usize) -> Self {
        Self::ChunkTooLarge { size, max }
    }

    /// Create an unencodable chunk error.
    pub fn unencodable(zeros: usize, ones: usize) -> Self {
        Self::Unencodable { zeros, ones }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Whether the chunk size or content is outside the encodable range.
    pub fn is_size_error(&self) -> bool {
        matches!(self, Self::ChunkTooLarge { .. } | Self::Unencodable { .. })
    }

    /// Whether the input bytes are not a well-formed block.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeader { .. } | Self::CorruptedData { .. } | Self::UnexpectedEof { .. }
        )
    }

    /// Whether the operation hit a closed stream.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl From<OxiArcError> for io::Error {
    fn from(err: OxiArcError) -> Self {
        let kind = match &err {
            OxiArcError::Io(e) => e.kind(),
            OxiArcError::Closed => io::ErrorKind::BrokenPipe,
            OxiArcError::InvalidConfig { .. } => io::ErrorKind::InvalidInput,
            e if e.is_size_error() => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::InvalidData,
        };
        match err {
            OxiArcError::Io(e) => e,
            other => io::Error::new(kind, other),
        }
    }
}
