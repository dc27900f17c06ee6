//! Format constants for meta blocks.
//!
//! Every size bound below follows from the block layout documented in the
//! crate root:
//!
//! ```text
//! 17 header bits + 3*HCLEN bits + HLIT bits + HDIST bits + EOB bits
//!   + 3 stored-block header bits + padding + 32 trailer bits
//! ```

/// Order in which code length code lengths are transmitted (RFC 1951).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Maximum literal/length code length in DEFLATE.
pub const MAX_CODE_LENGTH: u8 = 15;

/// Minimum number of literal/length codes (HLIT = 0).
pub const MIN_LITERALS: usize = 257;

/// Maximum number of literal/length codes accepted by inflaters.
pub const MAX_LITERALS: usize = 286;

/// End of block symbol.
pub const END_OF_BLOCK: usize = 256;

/// Block type of the dynamic Huffman block carrying the payload.
pub const BTYPE_DYNAMIC: u32 = 2;

/// Block type of the empty stored block that closes every meta block.
pub const BTYPE_STORED: u32 = 0;

/// LEN and NLEN of the empty stored block, as they appear on the wire.
///
/// These four bytes end every meta block and are what the reverse scanner
/// looks for.
pub const MAGIC: [u8; 4] = [0x00, 0x00, 0xFF, 0xFF];

/// Smallest chunk a block can carry.
pub const MIN_RAW_BYTES: usize = 0;

/// Largest chunk that may encode as a single block.
///
/// The separator after the data bits must sit before the end of block
/// symbol, so at most 254 data bits fit; 31 bytes is the largest whole
/// byte count.
pub const MAX_RAW_BYTES: usize = 31;

/// Largest chunk that always encodes, whatever its content.
///
/// The worst bit population is 63 marked bits, which needs a fill of
/// 65 codes of length 7: `8 * 27 + 1 + 65 = 282 <= 286`, while 28 bytes
/// would need 290 literal codes.
pub const ENSURE_RAW_BYTES: usize = 27;

/// Lower bound on the size of an encoded block.
///
/// `17 + 3*5 + 257 + 1 + 8 = 298` bits of dynamic block, 3 stored-block
/// header bits, rounded up to 38 bytes, plus the 4 trailer bytes.
pub const MIN_ENC_BYTES: usize = 42;

/// Upper bound on the size of an encoded block.
///
/// The most expensive solution the solver ever picks is an inverted layout
/// with `h = 7` and 286 literal codes: `17 + 3*6 + 286 + 6 + 7 = 334` bits
/// of dynamic block, 3 stored-block header bits, rounded up to 43 bytes,
/// plus the 4 trailer bytes.
pub const MAX_ENC_BYTES: usize = 47;

/// Position of a code length symbol in the transmitted HCLEN sequence.
pub fn code_length_index(symbol: usize) -> usize {
    CODE_LENGTH_ORDER
        .iter()
        .position(|&s| s == symbol)
        .unwrap_or(CODE_LENGTH_ORDER.len())
}
