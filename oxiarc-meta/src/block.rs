//! Meta block encoding and decoding.
//!
//! A meta block is a dynamic Huffman DEFLATE block whose only data symbol
//! is the end of block, followed by an empty stored block:
//!
//! ```text
//! [BFINAL=0][BTYPE=10][HLIT][HDIST][HCLEN]
//! [HCLEN+4 code length code lengths, 3 bits each]
//! [HLIT+257 literal lengths, 1 bit each]
//! [HDIST+1 distance lengths, 1 bit each, all zero]
//! [EOB codeword]
//! [BFINAL][BTYPE=00][padding] [00 00 FF FF]
//! ```
//!
//! The payload lives in the literal lengths, the [`LastMode`] and the
//! inversion flag live in `HDIST`, and the stored block trailer doubles as
//! the magic the reverse scanner looks for. A generic inflater decodes the
//! whole thing to zero bytes.

use crate::huffman::{HuffLengths, compute_lengths, count_bits};
use crate::tables::{
    BTYPE_DYNAMIC, BTYPE_STORED, CODE_LENGTH_ORDER, END_OF_BLOCK, MAGIC, MAX_CODE_LENGTH,
    MAX_ENC_BYTES, MAX_LITERALS, MAX_RAW_BYTES, MIN_LITERALS,
};
use crate::types::LastMode;
use oxiarc_core::error::{OxiArcError, Result};
use oxiarc_core::{BitReader, BitWriter};
use std::io::{self, Read};
use tracing::trace;

/// Largest `HDIST` a meta block uses: three modes, two orientations.
const MAX_HDIST: u32 = 5;

/// One decoded meta block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlock {
    /// The chunk carried by the block.
    pub data: Vec<u8>,
    /// Mode tag of the block.
    pub last: LastMode,
    /// Encoded size of the block in bytes.
    pub size: usize,
}

/// Encode one chunk as a meta block.
///
/// Fails with a size error when the chunk is longer than
/// [`MAX_RAW_BYTES`](crate::MAX_RAW_BYTES) or its bit population has no
/// valid layout. Chunks of up to
/// [`ENSURE_RAW_BYTES`](crate::ENSURE_RAW_BYTES) always encode.
pub fn encode_block(chunk: &[u8], last: LastMode) -> Result<Vec<u8>> {
    if chunk.len() > MAX_RAW_BYTES {
        return Err(OxiArcError::chunk_too_large(chunk.len(), MAX_RAW_BYTES));
    }
    let (zeros, ones) = count_bits(chunk);
    let hl =
        compute_lengths(zeros, ones).ok_or_else(|| OxiArcError::unencodable(zeros, ones))?;

    let mut writer = BitWriter::new(Vec::with_capacity(MAX_ENC_BYTES));
    write_dynamic(&mut writer, &hl, chunk, last)?;
    let dynamic_bits = writer.bits_written();

    // Empty stored block: byte-aligns the stream and carries the magic.
    writer.write_bit(last.is_final())?;
    writer.write_bits(BTYPE_STORED, 2)?;
    writer.align_to_byte()?;
    writer.write_bytes(&MAGIC)?;

    let out = writer.into_inner()?;
    trace!(
        raw = chunk.len(),
        encoded = out.len(),
        dynamic_bits,
        sym_len = hl.sym_len,
        inverted = hl.inverted,
        %last,
        "encoded meta block"
    );
    Ok(out)
}

fn write_dynamic<W: io::Write>(
    writer: &mut BitWriter<W>,
    hl: &HuffLengths,
    chunk: &[u8],
    last: LastMode,
) -> Result<()> {
    let hdist = last.index() + 3 * hl.inverted as u32;

    writer.write_bits(0, 1)?;
    writer.write_bits(BTYPE_DYNAMIC, 2)?;
    writer.write_bits((hl.num_literals - MIN_LITERALS) as u32, 5)?;
    writer.write_bits(hdist, 5)?;
    writer.write_bits((hl.num_clen - 4) as u32, 4)?;

    for len in hl.clen_lengths() {
        writer.write_bits(len as u32, 3)?;
    }
    // Code length symbol 0 has code '0' and symbol h has code '1'.
    for len in hl.literal_lengths(chunk) {
        writer.write_bit(len != 0)?;
    }
    for _ in 0..=hdist {
        writer.write_bit(false)?;
    }

    writer.write_code(hl.eob_code(), hl.sym_len)
}

/// Keeps a copy of every byte pulled through it.
struct RecordingReader<R> {
    inner: R,
    record: Vec<u8>,
}

impl<R: Read> Read for RecordingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.record.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

/// Decode one meta block from `src`.
///
/// Exactly the bytes of the block are consumed, so a stream of blocks can
/// be decoded by calling this repeatedly on the same source. Anything that
/// is not the canonical encoding of some chunk is rejected with a format
/// error.
pub fn decode_block<R: Read>(src: R) -> Result<DecodedBlock> {
    let mut reader = BitReader::new(RecordingReader {
        inner: src,
        record: Vec::with_capacity(MAX_ENC_BYTES),
    });

    let (data, last) = read_block(&mut reader)?;
    let bits = reader.bits_read();
    let record = reader.into_inner().record;

    let canonical = encode_block(&data, last)
        .map_err(|_| OxiArcError::corrupted(0, "payload has no canonical encoding"))?;
    if canonical != record {
        return Err(OxiArcError::corrupted(0, "non-canonical meta block"));
    }

    trace!(raw = data.len(), encoded = record.len(), bits, %last, "decoded meta block");
    Ok(DecodedBlock {
        data,
        last,
        size: record.len(),
    })
}

/// Decode one meta block from the start of `buf`.
///
/// Returns the chunk, its mode and the number of bytes consumed.
pub fn decode_slice(buf: &[u8]) -> Result<(Vec<u8>, LastMode, usize)> {
    let mut cursor = buf;
    let block = decode_block(&mut cursor)?;
    Ok((block.data, block.last, block.size))
}

/// Length of the longest prefix of `chunk` that encodes as one block.
///
/// At least `min(chunk.len(), ENSURE_RAW_BYTES)`.
pub fn encodable_prefix(chunk: &[u8]) -> usize {
    let mut len = chunk.len().min(MAX_RAW_BYTES);
    let (mut zeros, mut ones) = count_bits(&chunk[..len]);
    while len > 0 && compute_lengths(zeros, ones).is_none() {
        len -= 1;
        let byte_ones = chunk[len].count_ones() as usize;
        ones -= byte_ones;
        zeros -= 8 - byte_ones;
    }
    len
}

fn read_block<R: Read>(reader: &mut BitReader<R>) -> Result<(Vec<u8>, LastMode)> {
    if reader.read_bits(1)? != 0 {
        return Err(OxiArcError::invalid_header("final bit set on dynamic block"));
    }
    let btype = reader.read_bits(2)?;
    if btype != BTYPE_DYNAMIC {
        return Err(OxiArcError::invalid_header(format!(
            "block type {} is not dynamic",
            btype
        )));
    }

    let num_literals = reader.read_bits(5)? as usize + MIN_LITERALS;
    let hdist = reader.read_bits(5)?;
    let num_clen = reader.read_bits(4)? as usize + 4;
    if num_literals > MAX_LITERALS {
        return Err(OxiArcError::invalid_header(format!(
            "{} literal codes",
            num_literals
        )));
    }
    if hdist > MAX_HDIST {
        return Err(OxiArcError::invalid_header(format!("HDIST {}", hdist)));
    }
    let inverted = hdist >= 3;
    let last = LastMode::from_index(hdist % 3)
        .ok_or_else(|| OxiArcError::invalid_header("unknown mode"))?;

    let sym_len = read_clen_lengths(reader, num_clen)?;

    let mut lens = Vec::with_capacity(num_literals);
    for _ in 0..num_literals {
        lens.push(if reader.read_bit()? { sym_len } else { 0 });
    }
    for _ in 0..=hdist {
        if reader.read_bit()? {
            return Err(corrupted(reader, "distance code present"));
        }
    }

    if lens[END_OF_BLOCK] != sym_len {
        return Err(corrupted(reader, "end of block has no code"));
    }
    let used = lens.iter().filter(|&&l| l == sym_len).count();
    if used != 1 << sym_len {
        return Err(corrupted(reader, "literal tree is not complete"));
    }

    let num_bits =
        find_separator(&lens, sym_len).ok_or_else(|| corrupted(reader, "no separator"))?;
    if num_bits % 8 != 0 || num_bits > MAX_RAW_BYTES * 8 {
        return Err(corrupted(reader, "payload is not a whole chunk"));
    }

    let mut data = vec![0u8; num_bits / 8];
    for (i, &len) in lens[..num_bits].iter().enumerate() {
        if (len == sym_len) != inverted {
            data[i / 8] |= 1 << (i % 8);
        }
    }

    let eob_code = lens[..END_OF_BLOCK]
        .iter()
        .filter(|&&l| l == sym_len)
        .count() as u32;
    if reader.read_code(sym_len)? != eob_code {
        return Err(corrupted(reader, "expected end of block"));
    }

    read_trailer(reader, last)?;
    Ok((data, last))
}

/// Read the code length code and return the literal code length it allows.
fn read_clen_lengths<R: Read>(reader: &mut BitReader<R>, num_clen: usize) -> Result<u8> {
    let mut clen = [0u8; 19];
    for &sym in &CODE_LENGTH_ORDER[..num_clen] {
        clen[sym] = reader.read_bits(3)? as u8;
    }

    if clen[0] != 1 {
        return Err(OxiArcError::invalid_header("code length 0 not coded"));
    }
    let mut used = clen
        .iter()
        .enumerate()
        .skip(1)
        .filter(|&(_, &len)| len != 0);
    match (used.next(), used.next()) {
        (Some((sym, 1)), None) if sym <= MAX_CODE_LENGTH as usize => Ok(sym as u8),
        _ => Err(OxiArcError::invalid_header(
            "code length code is not two 1-bit symbols",
        )),
    }
}

/// Number of payload bits, found from the separator before the fill run.
fn find_separator(lens: &[u8], sym_len: u8) -> Option<usize> {
    let mut i = END_OF_BLOCK - 1;
    while lens[i] == 0 {
        i = i.checked_sub(1)?;
    }
    while i > 0 && lens[i - 1] == sym_len {
        i -= 1;
    }
    // `lens[i - 1]` is the separator, so `i - 1` payload bits precede it.
    i.checked_sub(1)
}

fn read_trailer<R: Read>(reader: &mut BitReader<R>, last: LastMode) -> Result<()> {
    if reader.read_bit()? != last.is_final() {
        return Err(corrupted(reader, "final flag disagrees with mode"));
    }
    if reader.read_bits(2)? != BTYPE_STORED {
        return Err(corrupted(reader, "trailer is not a stored block"));
    }
    if reader.align_to_byte() != 0 {
        return Err(corrupted(reader, "non-zero padding"));
    }
    let mut magic = [0u8; 4];
    reader.read_bytes(&mut magic)?;
    if magic != MAGIC {
        return Err(corrupted(reader, "bad trailer magic"));
    }
    Ok(())
}

fn corrupted<R: Read>(reader: &BitReader<R>, message: &str) -> OxiArcError {
    OxiArcError::corrupted(reader.bytes_consumed(), message)
}
