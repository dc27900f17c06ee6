//! Two-symbol code length solver.
//!
//! A meta block hides its payload in the literal/length code lengths of a
//! dynamic DEFLATE block. The code length alphabet used to transmit those
//! lengths holds exactly two symbols, `0` and `h`, each with a 1-bit code,
//! so every payload bit costs one bit on the wire.
//!
//! # Literal layout
//!
//! For `n` payload bits of which `m` are *marked* (equal to the marked
//! value, `1` normally and `0` for an inverted chunk):
//!
//! ```text
//! position:  0 .. n          n          n+1 ..            256
//! length:    h or 0 per bit  0 (sep)    fill of h ...     h (EOB)
//! ```
//!
//! The fill brings the number of length-`h` codes to exactly `2^h`, which
//! makes the literal tree complete. When the fill fits below the end of
//! block symbol the alphabet stays at 257 codes; otherwise it spills past
//! 256 and the alphabet grows up to 286 codes.

use crate::tables::{
    CODE_LENGTH_ORDER, END_OF_BLOCK, MAX_CODE_LENGTH, MAX_LITERALS, MAX_RAW_BYTES, MIN_LITERALS,
    code_length_index,
};

/// Count the 0-bits and 1-bits of a chunk.
///
/// Returns `(zeros, ones)`.
pub fn count_bits(chunk: &[u8]) -> (usize, usize) {
    let ones: usize = chunk.iter().map(|b| b.count_ones() as usize).sum();
    (chunk.len() * 8 - ones, ones)
}

/// Iterate over the bits of a chunk, LSB-first within each byte.
pub fn chunk_bits(chunk: &[u8]) -> impl Iterator<Item = bool> + '_ {
    chunk
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| (byte >> i) & 1 != 0))
}

/// Code lengths chosen for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffLengths {
    /// Length `h` shared by every used literal/length code.
    pub sym_len: u8,
    /// Whether the marked value is `0` instead of `1`.
    pub inverted: bool,
    /// Number of payload bits.
    pub num_bits: usize,
    /// Number of payload bits equal to the marked value.
    pub marked: usize,
    /// Codes of length `h` needed to complete the tree (`2^h - marked`).
    pub fill: usize,
    /// Number of literal/length code lengths transmitted (`HLIT + 257`).
    pub num_literals: usize,
    /// Number of code length code lengths transmitted (`HCLEN + 4`).
    pub num_clen: usize,
}

impl HuffLengths {
    /// Build the candidate for one orientation and code length, if feasible.
    fn candidate(zeros: usize, ones: usize, inverted: bool, sym_len: u8) -> Option<Self> {
        let num_bits = zeros + ones;
        let marked = if inverted { zeros } else { ones };
        let fill = (1usize << sym_len).checked_sub(marked)?;
        // One fill code always sits at or before 256 besides the EOB.
        if fill < 2 {
            return None;
        }
        let end = num_bits + 1 + fill;
        if end > MAX_LITERALS {
            return None;
        }
        Some(Self {
            sym_len,
            inverted,
            num_bits,
            marked,
            fill,
            num_literals: end.max(MIN_LITERALS),
            num_clen: code_length_index(sym_len as usize) + 1,
        })
    }

    /// Bits this choice costs on the wire beyond the fixed header fields.
    pub fn cost(&self) -> usize {
        3 * self.num_clen + self.num_literals + self.sym_len as usize + 3 * self.inverted as usize
    }

    /// Literal/length code lengths `(L0, L1)` given to a 0-bit and a 1-bit.
    pub fn lengths(&self) -> (u8, u8) {
        if self.inverted {
            (self.sym_len, 0)
        } else {
            (0, self.sym_len)
        }
    }

    /// Whether the fill spills past the end of block symbol.
    pub fn spills(&self) -> bool {
        self.num_literals > MIN_LITERALS
    }

    /// Canonical code of the end of block symbol.
    ///
    /// All used codes share length `h`, so the code is the number of used
    /// symbols before 256.
    pub fn eob_code(&self) -> u32 {
        let after = self.num_literals - MIN_LITERALS;
        ((1u32 << self.sym_len) - 1) - after as u32
    }

    /// Code length code lengths, `num_clen` entries in transmission order.
    pub fn clen_lengths(&self) -> Vec<u8> {
        CODE_LENGTH_ORDER[..self.num_clen]
            .iter()
            .map(|&sym| u8::from(sym == 0 || sym == self.sym_len as usize))
            .collect()
    }

    /// Literal/length code lengths for `chunk`, `num_literals` entries.
    pub fn literal_lengths(&self, chunk: &[u8]) -> Vec<u8> {
        let h = self.sym_len;
        let mut lens = vec![0u8; self.num_literals];
        for (slot, bit) in lens.iter_mut().zip(chunk_bits(chunk)) {
            if bit != self.inverted {
                *slot = h;
            }
        }

        let start = self.num_bits + 1;
        if self.spills() {
            lens[start..start + self.fill].fill(h);
        } else {
            lens[start..start + self.fill - 1].fill(h);
            lens[END_OF_BLOCK] = h;
        }
        lens
    }
}

/// Compute the cheapest code lengths for a chunk with the given bit counts.
///
/// Tries the plain orientation before the inverted one and shorter codes
/// before longer ones, keeping the first minimum. Returns `None` when no
/// layout fits in 286 literal codes; this never happens for chunks of up
/// to `ENSURE_RAW_BYTES` bytes.
pub fn compute_lengths(zeros: usize, ones: usize) -> Option<HuffLengths> {
    if zeros + ones > MAX_RAW_BYTES * 8 {
        return None;
    }

    let mut best: Option<HuffLengths> = None;
    for inverted in [false, true] {
        for sym_len in 1..=MAX_CODE_LENGTH {
            let Some(cand) = HuffLengths::candidate(zeros, ones, inverted, sym_len) else {
                continue;
            };
            if best.is_none_or(|b| cand.cost() < b.cost()) {
                best = Some(cand);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_len(lens: &[u8], h: u8) -> usize {
        lens.iter().filter(|&&l| l == h).count()
    }

    #[test]
    fn test_count_bits() {
        assert_eq!(count_bits(&[]), (0, 0));
        assert_eq!(count_bits(&[0xFF, 0x00, 0x01]), (15, 9));
    }

    #[test]
    fn test_chunk_bits_lsb_first() {
        let bits: Vec<bool> = chunk_bits(&[0b0000_0101]).collect();
        assert_eq!(
            bits,
            vec![true, false, true, false, false, false, false, false]
        );
    }

    #[test]
    fn test_empty_chunk() {
        let hl = compute_lengths(0, 0).unwrap();
        assert_eq!(hl.sym_len, 8);
        assert!(!hl.inverted);
        assert_eq!(hl.fill, 256);
        assert_eq!(hl.num_literals, 257);
        assert_eq!(hl.num_clen, 5);
        assert_eq!(hl.eob_code(), 255);
    }

    #[test]
    fn test_orientation() {
        // All ones: marking ones fills exactly up to the EOB.
        let hl = compute_lengths(0, 248).unwrap();
        assert!(!hl.inverted);
        assert_eq!(hl.lengths(), (0, 8));
        assert_eq!(hl.num_literals, 257);

        // All zeros: the same layout with the marked value flipped.
        let hl = compute_lengths(248, 0).unwrap();
        assert!(hl.inverted);
        assert_eq!(hl.lengths(), (8, 0));
        assert_eq!(hl.num_literals, 257);

        // A short run of zeros is cheaper with a smaller plain tree.
        let hl = compute_lengths(8, 0).unwrap();
        assert!(!hl.inverted);
        assert_eq!(hl.sym_len, 7);
    }

    #[test]
    fn test_spilling_layout() {
        let hl = compute_lengths(228, 20).unwrap();
        assert!(!hl.inverted);
        assert_eq!(hl.sym_len, 5);
        assert_eq!(hl.num_literals, 261);
        assert!(hl.spills());
        assert_eq!(hl.eob_code(), 31 - 4);
    }

    #[test]
    fn test_too_many_bits() {
        assert!(compute_lengths(MAX_RAW_BYTES * 8 + 1, 0).is_none());
        assert!(compute_lengths(0, MAX_RAW_BYTES * 8 + 8).is_none());
    }

    #[test]
    fn test_literal_lengths_complete() {
        let chunk = [0xA5u8, 0x3C, 0x00, 0xFF];
        let (zeros, ones) = count_bits(&chunk);
        let hl = compute_lengths(zeros, ones).unwrap();
        let lens = hl.literal_lengths(&chunk);

        assert_eq!(lens.len(), hl.num_literals);
        assert_eq!(lens[END_OF_BLOCK], hl.sym_len);
        assert_eq!(lens[hl.num_bits], 0);
        assert_eq!(count_len(&lens, hl.sym_len), 1 << hl.sym_len);
        assert_eq!(count_len(&lens, 0) + (1 << hl.sym_len), lens.len());

        // Kraft sum of a complete code is exactly one.
        let kraft: f64 = lens
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 0.5f64.powi(l as i32))
            .sum();
        assert!((kraft - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_eob_rank_matches_layout() {
        let chunks: [&[u8]; 5] = [
            &[],
            &[0xFF; 31],
            &[0x00; 31],
            &[0x01; 31],
            &[0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0],
        ];
        for chunk in chunks {
            let (zeros, ones) = count_bits(chunk);
            let hl = compute_lengths(zeros, ones).unwrap();
            let lens = hl.literal_lengths(chunk);
            let before = lens[..END_OF_BLOCK]
                .iter()
                .filter(|&&l| l == hl.sym_len)
                .count();
            assert_eq!(hl.eob_code() as usize, before);
        }
    }

    #[test]
    fn test_clen_lengths() {
        let hl = compute_lengths(0, 0).unwrap();
        // Order 16, 17, 18, 0, 8: only symbols 0 and 8 are used.
        assert_eq!(hl.clen_lengths(), vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_all_ensured_sizes_solve() {
        for num_bytes in 0..=crate::tables::ENSURE_RAW_BYTES {
            let n = num_bytes * 8;
            for zeros in 0..=n {
                assert!(
                    compute_lengths(zeros, n - zeros).is_some(),
                    "no solution for {} zeros, {} ones",
                    zeros,
                    n - zeros
                );
            }
        }
    }
}
