//! Streaming meta block writer.

use crate::block::{encodable_prefix, encode_block};
use crate::config::MetaConfig;
use crate::types::{LastMode, StreamStats};
use oxiarc_core::error::{OxiArcError, Result};
use std::io::{self, Write};
use tracing::debug;

/// Buffers raw bytes and writes them to a sink as meta blocks.
///
/// Whenever `chunk_size` bytes are pending a Continuation block is emitted.
/// [`MetaWriter::flush_block`] forces out whatever is pending under a chosen
/// [`LastMode`]; [`MetaWriter::close`] does the same with the configured
/// close mode and ends the stream.
///
/// # Example
///
/// ```
/// use oxiarc_meta::{LastMode, MetaWriter};
///
/// let mut writer = MetaWriter::new(Vec::new());
/// writer.write(b"checkpoint").unwrap();
/// writer.flush_block(LastMode::EndOfMetaSegment).unwrap();
/// writer.close().unwrap();
///
/// assert_eq!(writer.stats().num_blocks, 2);
/// assert_eq!(writer.last_mode(), LastMode::EndOfStream);
/// ```
#[derive(Debug)]
pub struct MetaWriter<W: Write> {
    inner: W,
    config: MetaConfig,
    pending: Vec<u8>,
    stats: StreamStats,
    last_mode: LastMode,
    /// The close block is in the sink; only the sink flush may be pending.
    finished: bool,
    closed: bool,
}

impl<W: Write> MetaWriter<W> {
    /// Create a writer with the default configuration.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            config: MetaConfig::DEFAULT,
            pending: Vec::with_capacity(MetaConfig::DEFAULT.chunk_size),
            stats: StreamStats::default(),
            last_mode: LastMode::default(),
            finished: false,
            closed: false,
        }
    }

    /// Create a writer with a custom configuration.
    pub fn with_config(inner: W, config: MetaConfig) -> Result<Self> {
        config.validate()?;
        let mut writer = Self::new(inner);
        writer.config = config;
        Ok(writer)
    }

    /// Accept all of `data`, emitting Continuation blocks as chunks fill.
    ///
    /// Either every byte is accepted or an error is returned and the writer
    /// is left as it was before the call. A sink that fails halfway through
    /// `write_all` may still have received part of the staged blocks.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.check_open()?;
        let restore = self.pending.len();
        self.pending.extend_from_slice(data);

        let chunk_size = self.config.chunk_size;
        let mut staged = Vec::new();
        let mut start = 0;
        let mut blocks = 0;
        while self.pending.len() - start >= chunk_size {
            let window = &self.pending[start..start + chunk_size];
            let n = encodable_prefix(window).max(1);
            match encode_block(&window[..n], LastMode::Continuation) {
                Ok(block) => staged.extend_from_slice(&block),
                Err(e) => {
                    self.pending.truncate(restore);
                    return Err(e);
                }
            }
            start += n;
            blocks += 1;
        }

        if let Err(e) = self.commit(&staged, blocks, LastMode::Continuation) {
            self.pending.truncate(restore);
            return Err(e);
        }
        self.pending.drain(..start);
        self.stats.input_offset += data.len() as u64;
        Ok(data.len())
    }

    /// Emit everything pending as a block tagged `last`.
    ///
    /// The pending bytes may be empty. If they do not fit a single block,
    /// a Continuation block for the longest encodable prefix goes first.
    pub fn flush_block(&mut self, last: LastMode) -> Result<()> {
        self.check_open()?;

        let mut staged = Vec::new();
        let mut start = 0;
        let mut blocks = 0;
        loop {
            let rest = &self.pending[start..];
            let n = encodable_prefix(rest);
            blocks += 1;
            if n == rest.len() {
                staged.extend_from_slice(&encode_block(rest, last)?);
                break;
            }
            let n = n.max(1);
            staged.extend_from_slice(&encode_block(&rest[..n], LastMode::Continuation)?);
            start += n;
        }

        self.commit(&staged, blocks, last)?;
        self.pending.clear();
        Ok(())
    }

    /// Flush the pending bytes with the configured close mode and end the
    /// stream.
    ///
    /// Closing twice is a no-op. Any later write or flush fails with
    /// [`OxiArcError::Closed`]. If the sink flush fails, the close block
    /// has already been written and calling `close()` again only retries
    /// the flush.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if !self.finished {
            self.flush_block(self.config.close_mode)?;
            self.finished = true;
        }
        self.inner.flush()?;
        self.closed = true;
        debug!(
            input = self.stats.input_offset,
            output = self.stats.output_offset,
            blocks = self.stats.num_blocks,
            "meta writer closed"
        );
        Ok(())
    }

    fn commit(&mut self, staged: &[u8], blocks: u64, last: LastMode) -> Result<()> {
        if blocks == 0 {
            return Ok(());
        }
        self.inner.write_all(staged)?;
        self.stats.output_offset += staged.len() as u64;
        self.stats.num_blocks += blocks;
        self.last_mode = last;
        debug!(blocks, bytes = staged.len(), %last, "emitted meta blocks");
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        if self.finished {
            Err(OxiArcError::Closed)
        } else {
            Ok(())
        }
    }

    /// Counters of this writer.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Mode of the most recently emitted block.
    pub fn last_mode(&self) -> LastMode {
        self.last_mode
    }

    /// Whether `close()` has completed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Configuration in use.
    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    /// Bytes accepted but not yet emitted.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Get a reference to the sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Get a mutable reference to the sink.
    ///
    /// Writing to the sink directly interleaves foreign data with meta
    /// blocks.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the sink. Pending bytes are dropped.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for MetaWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(MetaWriter::write(self, buf)?)
    }

    /// Flushes the sink only; pending bytes stay pending.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
