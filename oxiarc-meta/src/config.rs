//! Writer configuration.

use crate::tables::MAX_RAW_BYTES;
use crate::types::LastMode;
use oxiarc_core::error::{OxiArcError, Result};

/// Meta writer configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaConfig {
    /// Pending bytes at which a Continuation block is emitted automatically
    /// (1 to `MAX_RAW_BYTES`).
    pub chunk_size: usize,
    /// Mode of the block emitted by `close()`.
    pub close_mode: LastMode,
}

impl MetaConfig {
    /// Largest chunks, stream closed with `EndOfStream`.
    pub const DEFAULT: Self = Self {
        chunk_size: MAX_RAW_BYTES,
        close_mode: LastMode::EndOfStream,
    };

    /// Largest chunks, closing only the meta segment so that ordinary
    /// DEFLATE blocks may follow.
    pub const SEGMENT: Self = Self {
        chunk_size: MAX_RAW_BYTES,
        close_mode: LastMode::EndOfMetaSegment,
    };

    /// Create a configuration with the given auto-emit threshold.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::DEFAULT
        }
    }

    /// Set the mode used by `close()`.
    pub fn with_close_mode(mut self, close_mode: LastMode) -> Self {
        self.close_mode = close_mode;
        self
    }

    /// Check that the threshold is within `1..=MAX_RAW_BYTES`.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(OxiArcError::invalid_config("chunk size must be non-zero"));
        }
        if self.chunk_size > MAX_RAW_BYTES {
            return Err(OxiArcError::chunk_too_large(self.chunk_size, MAX_RAW_BYTES));
        }
        Ok(())
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
