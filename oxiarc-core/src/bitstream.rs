//! Bit-level I/O for DEFLATE-framed meta blocks.
//!
//! This module provides `BitReader` and `BitWriter` for reading and writing
//! data at the bit level.
//!
//! # Bit Ordering
//!
//! DEFLATE uses LSB-first (Least Significant Bit first) ordering within
//! bytes. Bits are packed starting from the least significant bit of each
//! byte. Huffman codes are the one exception: they are packed starting with
//! their most significant bit, so writers reverse them before calling
//! [`BitWriter::write_bits`].
//!
//! # Exact consumption
//!
//! `BitReader` pulls one byte at a time from the underlying reader and only
//! when the requested bits are not already buffered. A block decoder that
//! stops at a byte boundary has therefore consumed exactly the bytes of that
//! block and nothing more, which lets a stream of blocks be read from a
//! plain `Read` without an intermediate buffer.
//!
//! # Example
//!
//! ```
//! use oxiarc_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! // Writing bits
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();  // Write 3 bits
//! writer.write_bits(0b1100, 4).unwrap(); // Write 4 bits
//! let output = writer.into_inner().unwrap();
//!
//! // Reading bits
//! let mut reader = BitReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! assert_eq!(reader.bytes_consumed(), 1);
//! ```

use crate::error::{OxiArcError, Result};
use std::io::{self, Read, Write};

/// A bit-level reader that wraps any `Read` implementation.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
    /// Bytes pulled from the underlying reader.
    bytes_consumed: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
            bytes_consumed: 0,
        }
    }

    /// Consume this `BitReader` and return the underlying reader.
    ///
    /// Bits still buffered belong to a byte that was already consumed.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Get the total number of bits read so far.
    pub fn bits_read(&self) -> u64 {
        self.total_bits_read
    }

    /// Get the number of bytes pulled from the underlying reader.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Pull bytes one at a time until at least `count` bits are buffered.
    fn fill_buffer(&mut self, count: u8) -> Result<()> {
        debug_assert!(count <= 56, "Cannot fill more than 56 bits at once");

        while self.bits_in_buffer < count {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    let missing = (count - self.bits_in_buffer).div_ceil(8);
                    return Err(OxiArcError::unexpected_eof(missing as usize));
                }
                Ok(_) => {
                    self.buffer |= (byte[0] as u64) << self.bits_in_buffer;
                    self.bits_in_buffer += 8;
                    self.bytes_consumed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Read up to 32 bits from the stream.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of bits to read (0-32)
    ///
    /// # Returns
    ///
    /// The bits read as a u32, with the first bit read in the LSB position.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill_buffer(count)?;

        let mask = (1u64 << count).wrapping_sub(1);
        let result = (self.buffer & mask) as u32;

        self.buffer >>= count;
        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;

        Ok(result)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Read a Huffman code of `length` bits, most significant bit first.
    pub fn read_code(&mut self, length: u8) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..length {
            code = (code << 1) | self.read_bits(1)?;
        }
        Ok(code)
    }

    /// Align to the next byte boundary.
    ///
    /// Returns the discarded padding bits so callers can insist on zero
    /// padding.
    pub fn align_to_byte(&mut self) -> u32 {
        let remainder = self.bits_in_buffer % 8;
        if remainder == 0 {
            return 0;
        }
        let padding = (self.buffer & ((1u64 << remainder) - 1)) as u32;
        self.buffer >>= remainder;
        self.bits_in_buffer -= remainder;
        self.total_bits_read += remainder as u64;
        padding
    }

    /// Read bytes from a byte-aligned position.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        for slot in buf.iter_mut() {
            *slot = self.read_bits(8)? as u8;
        }
        Ok(())
    }
}

/// A bit-level writer that wraps any `Write` implementation.
///
/// `BitWriter` accumulates bits in an internal buffer and flushes complete
/// bytes to the underlying writer. Call `flush()` or `into_inner()` when
/// done to write any remaining partial byte.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_written: 0,
        }
    }

    /// Pad the final byte with zeros, flush, and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Flush complete bytes from the buffer to the writer.
    #[inline]
    fn flush_bytes(&mut self) -> Result<()> {
        if self.bits_in_buffer >= 32 {
            let bytes = (self.buffer as u32).to_le_bytes();
            self.writer.write_all(&bytes)?;
            self.buffer >>= 32;
            self.bits_in_buffer -= 32;
        }

        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer & 0xFF) as u8;
            self.writer.write_all(&[byte])?;
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
        Ok(())
    }

    /// Write up to 32 bits to the stream.
    ///
    /// # Arguments
    ///
    /// * `value` - The bits to write (LSB-first)
    /// * `count` - Number of bits to write (0-32)
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if count == 0 {
            return Ok(());
        }

        let mask = if count == 32 {
            u32::MAX
        } else {
            (1u32 << count).wrapping_sub(1)
        };
        let value = value & mask;

        self.buffer |= (value as u64) << self.bits_in_buffer;
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        self.flush_bytes()
    }

    /// Write a single bit.
    #[inline(always)]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.buffer |= (bit as u64) << self.bits_in_buffer;
        self.bits_in_buffer += 1;
        self.total_bits_written += 1;

        if self.bits_in_buffer >= 8 {
            self.flush_bytes()?;
        }

        Ok(())
    }

    /// Write a Huffman code of `length` bits, most significant bit first.
    pub fn write_code(&mut self, code: u32, length: u8) -> Result<()> {
        self.write_bits(reverse_bits(code, length), length)
    }

    /// Pad to byte boundary with zeros.
    pub fn align_to_byte(&mut self) -> Result<()> {
        if self.bits_in_buffer % 8 != 0 {
            let padding = 8 - (self.bits_in_buffer % 8);
            self.write_bits(0, padding)?;
        }
        Ok(())
    }

    /// Flush any remaining bits to the underlying writer.
    ///
    /// If there are partial bits, they are padded with zeros to complete
    /// the final byte.
    pub fn flush(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.flush_bytes()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write bytes at a byte-aligned position.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        debug_assert!(self.bits_in_buffer % 8 == 0, "write_bytes needs alignment");
        self.flush_bytes()?;
        self.writer.write_all(buf)?;
        self.total_bits_written += buf.len() as u64 * 8;
        Ok(())
    }
}

/// Reverse the low `length` bits of `code`.
pub fn reverse_bits(mut code: u32, length: u8) -> u32 {
    let mut reversed = 0u32;
    for _ in 0..length {
        reversed = (reversed << 1) | (code & 1);
        code >>= 1;
    }
    reversed
}
