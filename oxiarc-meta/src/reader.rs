//! Streaming meta block reader.

use crate::block::decode_block;
use crate::types::{LastMode, StreamStats};
use oxiarc_core::error::{OxiArcError, Result};
use std::io::{self, Read};
use tracing::debug;

/// Decodes a sequence of meta blocks from a source.
///
/// Blocks are consumed one at a time and exactly, so the source is left
/// positioned right after the last block read. Reading stops after a block
/// tagged [`LastMode::EndOfStream`] or [`LastMode::EndOfMetaSegment`];
/// running out of input before such a block is a format error.
///
/// The first decode error is sticky: the source is left somewhere inside
/// the bad block, so every later read fails as well.
///
/// # Example
///
/// ```
/// use oxiarc_meta::{MetaReader, MetaWriter};
/// use std::io::Read;
///
/// let mut writer = MetaWriter::new(Vec::new());
/// writer.write(b"hello").unwrap();
/// writer.close().unwrap();
/// let encoded = writer.into_inner();
///
/// let mut reader = MetaReader::new(&encoded[..]);
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out).unwrap();
/// assert_eq!(out, b"hello");
/// ```
#[derive(Debug)]
pub struct MetaReader<R: Read> {
    inner: Option<R>,
    stats: StreamStats,
    last_mode: LastMode,
    done: bool,
    failed: bool,
    chunk: Vec<u8>,
    pos: usize,
}

impl<R: Read> MetaReader<R> {
    /// Create a reader over `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner: Some(inner),
            stats: StreamStats::default(),
            last_mode: LastMode::default(),
            done: false,
            failed: false,
            chunk: Vec::new(),
            pos: 0,
        }
    }

    /// Decode the next block and return its chunk.
    ///
    /// Returns `None` once a terminal block has been consumed. Chunks still
    /// buffered for [`Read`] are not returned here.
    pub fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.as_mut().ok_or(OxiArcError::Closed)?;
        if self.failed {
            return Err(OxiArcError::corrupted(
                self.stats.input_offset,
                "stream failed at an earlier block",
            ));
        }
        if self.done {
            return Ok(None);
        }

        let block = match decode_block(inner) {
            Ok(block) => block,
            Err(e) => {
                self.failed = true;
                debug!(
                    blocks = self.stats.num_blocks,
                    input = self.stats.input_offset,
                    error = %e,
                    "meta block decode failed"
                );
                return Err(e);
            }
        };
        self.stats.input_offset += block.size as u64;
        self.stats.output_offset += block.data.len() as u64;
        self.stats.num_blocks += 1;
        self.last_mode = block.last;
        if block.last.is_terminal() {
            self.done = true;
            debug!(
                blocks = self.stats.num_blocks,
                input = self.stats.input_offset,
                last = %block.last,
                "meta segment ended"
            );
        }
        Ok(Some(block.data))
    }

    /// Continue with the next segment after an `EndOfMetaSegment` block.
    ///
    /// Returns `false` when the reader is not sitting at a segment end,
    /// including after `EndOfStream`.
    pub fn next_segment(&mut self) -> Result<bool> {
        if self.inner.is_none() {
            return Err(OxiArcError::Closed);
        }
        if self.done && self.last_mode == LastMode::EndOfMetaSegment {
            self.done = false;
            return Ok(true);
        }
        Ok(false)
    }

    /// Release the source. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.inner = None;
        self.chunk = Vec::new();
        self.pos = 0;
    }

    /// Whether a decode error has stopped the reader.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Whether a terminal block has been consumed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Counters of this reader.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Mode of the most recently decoded block.
    pub fn last_mode(&self) -> LastMode {
        self.last_mode
    }

    /// Get a reference to the source, unless closed.
    pub fn get_ref(&self) -> Option<&R> {
        self.inner.as_ref()
    }

    /// Consume the reader and return the source, unless closed.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }
}

impl<R: Read> Read for MetaReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos == self.chunk.len() {
            match self.read_chunk()? {
                Some(chunk) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                None => return Ok(0),
            }
        }

        let n = buf.len().min(self.chunk.len() - self.pos);
        buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
