//! Block tags and stream counters.

use std::fmt;

/// What follows a meta block in the stream.
///
/// The mode is chosen when a block is flushed and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LastMode {
    /// More meta blocks of the same segment follow.
    #[default]
    Continuation,
    /// The current meta segment ends here; another segment may follow.
    EndOfMetaSegment,
    /// The whole stream ends here.
    EndOfStream,
}

impl LastMode {
    /// All modes, in wire order.
    pub const ALL: [LastMode; 3] = [
        LastMode::Continuation,
        LastMode::EndOfMetaSegment,
        LastMode::EndOfStream,
    ];

    /// Discriminator carried in the block header.
    pub fn index(self) -> u32 {
        match self {
            LastMode::Continuation => 0,
            LastMode::EndOfMetaSegment => 1,
            LastMode::EndOfStream => 2,
        }
    }

    /// Inverse of [`LastMode::index`].
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Whether a reader stops after a block with this mode.
    pub fn is_terminal(self) -> bool {
        !matches!(self, LastMode::Continuation)
    }

    /// Whether the block closes the DEFLATE stream (BFINAL set).
    pub fn is_final(self) -> bool {
        matches!(self, LastMode::EndOfStream)
    }
}

impl fmt::Display for LastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LastMode::Continuation => "continuation",
            LastMode::EndOfMetaSegment => "end-of-meta-segment",
            LastMode::EndOfStream => "end-of-stream",
        };
        f.write_str(name)
    }
}

/// Byte and block counters of a writer or reader.
///
/// For a writer, `input_offset` counts raw bytes accepted and
/// `output_offset` counts encoded bytes emitted. For a reader it is the
/// other way round: encoded bytes consumed and raw bytes produced. After a
/// full round trip the counters of both ends agree cross-wise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Bytes taken in.
    pub input_offset: u64,
    /// Bytes handed out.
    pub output_offset: u64,
    /// Meta blocks emitted or consumed.
    pub num_blocks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_index_roundtrip() {
        for mode in LastMode::ALL {
            assert_eq!(LastMode::from_index(mode.index()), Some(mode));
        }
        assert_eq!(LastMode::from_index(3), None);
    }

    #[test]
    fn test_mode_flags() {
        assert_eq!(LastMode::default(), LastMode::Continuation);
        assert!(!LastMode::Continuation.is_terminal());
        assert!(LastMode::EndOfMetaSegment.is_terminal());
        assert!(!LastMode::EndOfMetaSegment.is_final());
        assert!(LastMode::EndOfStream.is_final());
        assert_eq!(LastMode::EndOfStream.to_string(), "end-of-stream");
    }
}
