//! 7-bit packing for blocks whose bytes all have the high bit clear.

use oxitiny_core::{BitReader, BitWriter, Result};

use crate::symbols::high_bit_clear;

/// Encode `input` at 7 bits per byte, or `None` if any byte has its high bit set.
pub fn encode(input: &[u8]) -> Option<BitWriter> {
    if !high_bit_clear(input) {
        return None;
    }

    let mut writer = BitWriter::with_capacity((input.len() * 7).div_ceil(8));
    for &b in input {
        writer.write_bits(b as u32, 7);
    }
    Some(writer)
}

/// Decode a block of `n` bytes.
pub fn decode(reader: &mut BitReader<'_>, n: usize) -> Result<Vec<u8>> {
    (0..n).map(|_| Ok(reader.read_bits(7)? as u8)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let input: Vec<u8> = (0..64u8).map(|i| i.wrapping_mul(37) & 0x7F).collect();
        let writer = encode(&input).unwrap();
        assert_eq!(writer.bits_written(), 64 * 7);
        let data = writer.into_vec();
        assert_eq!(data.len(), 56);

        let mut reader = BitReader::new(&data);
        assert_eq!(decode(&mut reader, 64).unwrap(), input);
    }

    #[test]
    fn test_rejects_high_bit() {
        assert!(encode(b"abc\x80").is_none());
    }

    #[test]
    fn test_truncated_input() {
        let data = [0u8; 6];
        let mut reader = BitReader::new(&data);
        assert!(decode(&mut reader, 7).is_err());
    }
}
