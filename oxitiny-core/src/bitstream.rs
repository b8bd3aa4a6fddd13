//! Bit-level I/O over in-memory buffers.
//!
//! This module provides `BitWriter` and `BitReader`, the single cursor
//! abstraction every OxiTiny coder uses to emit and consume fields that are
//! not byte-aligned.
//!
//! # Bit Ordering
//!
//! Fields are packed LSB-first: the first bit written lands in the least
//! significant bit of the first byte, and a multi-bit field is laid down
//! starting from its own least significant bit. Fields may straddle byte
//! boundaries freely.
//!
//! # Example
//!
//! ```
//! use oxitiny_core::bitstream::{BitReader, BitWriter};
//!
//! // Writing bits
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);  // Write 3 bits
//! writer.write_bits(0b1100, 4); // Write 4 bits
//! let output = writer.into_vec();
//! assert_eq!(output, vec![0b0110_0101]);
//!
//! // Reading bits
//! let mut reader = BitReader::new(&output);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{Result, TinyError};

/// Largest field width accepted by a single read or write.
pub const MAX_FIELD_BITS: u8 = 16;

/// A bit-level writer that accumulates into an owned byte vector.
///
/// Newly touched bytes start zeroed, so the final partial byte is padded
/// with zero bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitWriter {
    /// Completed bytes.
    output: Vec<u8>,
    /// Pending bits (LSB-first).
    buffer: u32,
    /// Number of valid bits in buffer (always < 8 between calls).
    bits_in_buffer: u8,
}

impl BitWriter {
    /// Create an empty `BitWriter`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty `BitWriter` with room for `bytes` output bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            output: Vec::with_capacity(bytes),
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Total number of bits written so far.
    #[inline]
    pub fn bits_written(&self) -> usize {
        self.output.len() * 8 + self.bits_in_buffer as usize
    }

    /// Number of bytes touched so far, counting a trailing partial byte.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bits_written().div_ceil(8)
    }

    /// Check whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty() && self.bits_in_buffer == 0
    }

    /// Write the low `count` bits of `value`.
    ///
    /// # Arguments
    ///
    /// * `value` - The bits to write (LSB-first); higher bits are ignored
    /// * `count` - Number of bits to write (0-16)
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(
            count <= MAX_FIELD_BITS,
            "Cannot write more than 16 bits at once"
        );

        if count == 0 {
            return;
        }

        let mask = (1u32 << count).wrapping_sub(1);
        self.buffer |= (value & mask) << self.bits_in_buffer;
        self.bits_in_buffer += count;

        while self.bits_in_buffer >= 8 {
            self.output.push((self.buffer & 0xFF) as u8);
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
    }

    /// Write a single bit.
    #[inline(always)]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u32, 1);
    }

    /// Write a full byte at the current (possibly unaligned) position.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.write_bits(byte as u32, 8);
    }

    /// Write each byte of `bytes` as an 8-bit field.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.bits_in_buffer == 0 {
            self.output.extend_from_slice(bytes);
        } else {
            for &byte in bytes {
                self.write_byte(byte);
            }
        }
    }

    /// Append every bit written to `other`, preserving their order.
    pub fn append(&mut self, other: &BitWriter) {
        self.write_bytes(&other.output);
        self.write_bits(other.buffer, other.bits_in_buffer);
    }

    /// Pad to the next byte boundary with zero bits.
    pub fn align_to_byte(&mut self) {
        if self.bits_in_buffer > 0 {
            self.output.push((self.buffer & 0xFF) as u8);
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    /// Consume the writer and return the bytes, padding the final partial byte.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.output
    }
}

/// A bit-level reader over a borrowed byte slice.
///
/// Reads past the end of the slice fail with [`TinyError::UnexpectedEof`];
/// peeks past the end see zero bits.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Current bit position from the start of `data`.
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new `BitReader` positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Get the underlying slice.
    pub fn get_ref(&self) -> &'a [u8] {
        self.data
    }

    /// Get the current bit position (for error reporting).
    #[inline]
    pub fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Number of bytes touched so far, counting a partially read byte.
    #[inline]
    pub fn bytes_consumed(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }

    /// Number of bits left before the end of the slice.
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }

    /// Gather `count` bits starting at `pos`, treating bits past the end as zero.
    #[inline]
    fn gather(&self, mut pos: usize, count: u8) -> u32 {
        let mut value = 0u32;
        let mut got = 0u8;
        while got < count {
            let byte = self.data.get(pos / 8).copied().unwrap_or(0) as u32;
            let offset = (pos % 8) as u8;
            let take = (8 - offset).min(count - got);
            let bits = (byte >> offset) & ((1u32 << take) - 1);
            value |= bits << got;
            got += take;
            pos += take as usize;
        }
        value
    }

    /// Read `count` bits and advance.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of bits to read (0-16)
    ///
    /// # Returns
    ///
    /// The bits read as a u32, with the first bit read in the LSB position.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(
            count <= MAX_FIELD_BITS,
            "Cannot read more than 16 bits at once"
        );

        if count as usize > self.remaining_bits() {
            return Err(TinyError::unexpected_eof(self.bit_pos));
        }

        let value = self.gather(self.bit_pos, count);
        self.bit_pos += count as usize;
        Ok(value)
    }

    /// Peek at `count` bits without consuming them.
    ///
    /// Bits beyond the end of the input read as zero, so a decoder can look
    /// ahead for its longest code even when the final code is shorter.
    #[inline]
    pub fn peek_bits(&self, count: u8) -> u32 {
        debug_assert!(
            count <= MAX_FIELD_BITS,
            "Cannot peek more than 16 bits at once"
        );
        self.gather(self.bit_pos, count)
    }

    /// Skip a number of bits.
    pub fn skip_bits(&mut self, count: u8) -> Result<()> {
        if count as usize > self.remaining_bits() {
            return Err(TinyError::unexpected_eof(self.bit_pos));
        }
        self.bit_pos += count as usize;
        Ok(())
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Read a full byte at the current (possibly unaligned) position.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Align to the next byte boundary by discarding partial bits.
    pub fn align_to_byte(&mut self) {
        self.bit_pos = self.bit_pos.div_ceil(8) * 8;
    }
}

/// Number of bits needed to write any value in `0..count`, never less than one.
///
/// This is the width of a field that selects one of `count` alternatives.
#[inline]
pub fn bits_for(count: usize) -> u8 {
    if count <= 2 {
        1
    } else {
        (usize::BITS - (count - 1).leading_zeros()) as u8
    }
}
