//! Backward search for meta blocks.
//!
//! Every meta block ends with the stored block bytes `00 00 FF FF`. The
//! scanner finds the right-most occurrence of that magic, then tries every
//! possible block start `MIN_ENC_BYTES..=MAX_ENC_BYTES` bytes before the end
//! of the magic and accepts a start only if the bytes in between decode as
//! a canonical meta block. A match in arbitrary data therefore needs the
//! whole block to be bit-exact, not just the magic.
//!
//! Each magic occurrence costs at most a handful of bounded decodes, so
//! enumerating all blocks of a buffer is linear in its length.

use crate::block::decode_slice;
use crate::tables::{MAGIC, MAX_ENC_BYTES, MIN_ENC_BYTES};
use crate::types::LastMode;
use memchr::memmem::FinderRev;
use tracing::{debug, trace};

/// A meta block found in a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedBlock {
    /// Byte offset of the first byte of the block.
    pub offset: usize,

    /// Encoded size of the block in bytes.
    pub size: usize,

    /// Mode tag of the block.
    pub last: LastMode,

    /// The chunk carried by the block.
    pub data: Vec<u8>,
}

impl LocatedBlock {
    /// Offset one past the last byte of the block.
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Find the start offset of the last meta block in `buf`.
///
/// Returns `None` when no verified block exists, including for buffers
/// shorter than the smallest block.
pub fn reverse_search(buf: &[u8]) -> Option<usize> {
    reverse_locate(buf).map(|block| block.offset)
}

/// Find and decode the last meta block in `buf`.
pub fn reverse_locate(buf: &[u8]) -> Option<LocatedBlock> {
    let finder = FinderRev::new(&MAGIC);
    let mut end = buf.len();

    while let Some(pos) = finder.rfind(&buf[..end]) {
        let block_end = pos + MAGIC.len();
        trace!(offset = pos, "candidate magic");

        if let Some(block) = verify_ending_at(buf, block_end) {
            debug!(
                offset = block.offset,
                size = block.size,
                last = %block.last,
                "located meta block"
            );
            return Some(block);
        }

        // Keep all but the last magic byte so the next hit starts before `pos`.
        end = block_end - 1;
    }
    None
}

/// Try every start that would make a block end exactly at `block_end`.
fn verify_ending_at(buf: &[u8], block_end: usize) -> Option<LocatedBlock> {
    let latest = block_end.checked_sub(MIN_ENC_BYTES)?;
    let earliest = block_end.saturating_sub(MAX_ENC_BYTES);

    (earliest..=latest).rev().find_map(|start| {
        let candidate = &buf[start..block_end];
        match decode_slice(candidate) {
            Ok((data, last, size)) if size == candidate.len() => Some(LocatedBlock {
                offset: start,
                size,
                last,
                data,
            }),
            _ => None,
        }
    })
}

/// Iterate over all meta blocks of `buf`, most recent first.
///
/// Iteration stops at the first position where no block ends at or before
/// the start of the previously found block.
pub fn reverse_blocks(buf: &[u8]) -> ReverseBlocks<'_> {
    ReverseBlocks {
        buf,
        end: buf.len(),
    }
}

/// Iterator returned by [`reverse_blocks`].
#[derive(Debug, Clone)]
pub struct ReverseBlocks<'a> {
    buf: &'a [u8],
    end: usize,
}

impl ReverseBlocks<'_> {
    /// Bytes before the most recently yielded block.
    pub fn remaining(&self) -> usize {
        self.end
    }
}

impl Iterator for ReverseBlocks<'_> {
    type Item = LocatedBlock;

    fn next(&mut self) -> Option<Self::Item> {
        let block = reverse_locate(&self.buf[..self.end])?;
        self.end = block.offset;
        Some(block)
    }
}
