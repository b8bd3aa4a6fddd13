//! Fixed-width symbol coding.
//!
//! Each byte is replaced by its first-occurrence rank, packed at the
//! smallest width that covers the unique count. The header carries the
//! unique count and the unique values. Position 0 always holds rank 0, so
//! its rank is not stored.

use oxitiny_core::{BitReader, BitWriter, Result, TinyError};

use crate::symbols::SymbolTable;

/// Largest unique count this mode accepts.
pub const MAX_FIXED_UNIQUES: usize = 16;

/// Bits per rank for `uniques` distinct values.
pub fn width_for(uniques: usize) -> u8 {
    match uniques {
        0 | 1 => 0,
        2 => 1,
        3..=4 => 2,
        5..=8 => 3,
        _ => 4,
    }
}

/// Exact payload size in bits for a block of `n` bytes with `uniques` distinct values.
pub fn payload_bits(n: usize, uniques: usize) -> usize {
    4 + 8 * uniques + n.saturating_sub(1) * width_for(uniques) as usize
}

/// Encode `input` using a table built over the whole block.
///
/// Returns `None` when the block has more than 16 distinct values or the
/// table does not cover every byte.
pub fn encode(input: &[u8], table: &SymbolTable) -> Option<BitWriter> {
    let uniques = table.len();
    if input.is_empty() || uniques == 0 || uniques > MAX_FIXED_UNIQUES {
        return None;
    }

    let width = width_for(uniques);
    let mut writer = BitWriter::with_capacity(payload_bits(input.len(), uniques).div_ceil(8));
    writer.write_bits(uniques as u32 - 1, 4);
    writer.write_bytes(table.uniques());

    for &b in &input[1..] {
        let rank = table.rank(b)?;
        writer.write_bits(rank as u32, width);
    }
    Some(writer)
}

/// Decode a block of `n` bytes.
pub fn decode(reader: &mut BitReader<'_>, n: usize) -> Result<Vec<u8>> {
    let uniques = reader.read_bits(4)? as usize + 1;
    let mut values = [0u8; MAX_FIXED_UNIQUES];
    for value in values.iter_mut().take(uniques) {
        *value = reader.read_byte()?;
    }

    let width = width_for(uniques);
    let mut output = Vec::with_capacity(n);
    output.push(values[0]);
    while output.len() < n {
        let rank = reader.read_bits(width)? as usize;
        if rank >= uniques {
            return Err(TinyError::corrupted(
                reader.bit_position(),
                format!("rank {rank} out of range for {uniques} uniques"),
            ));
        }
        output.push(values[rank]);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u8]) -> usize {
        let table = SymbolTable::from_bytes(input);
        let writer = encode(input, &table).unwrap();
        let bits = writer.bits_written();
        assert_eq!(bits, payload_bits(input.len(), table.len()));
        let data = writer.into_vec();
        let mut reader = BitReader::new(&data);
        assert_eq!(decode(&mut reader, input.len()).unwrap(), input);
        bits
    }

    #[test]
    fn test_widths() {
        assert_eq!(width_for(1), 0);
        assert_eq!(width_for(2), 1);
        assert_eq!(width_for(3), 2);
        assert_eq!(width_for(4), 2);
        assert_eq!(width_for(5), 3);
        assert_eq!(width_for(8), 3);
        assert_eq!(width_for(9), 4);
        assert_eq!(width_for(16), 4);
    }

    #[test]
    fn test_single_unique_has_no_payload() {
        assert_eq!(roundtrip(&[0x41; 64]), 12);
    }

    #[test]
    fn test_two_uniques() {
        let input: Vec<u8> = (0..64).map(|i| if i % 3 == 0 { 0xAA } else { 0x55 }).collect();
        assert_eq!(roundtrip(&input), 4 + 16 + 63);
    }

    #[test]
    fn test_sixteen_uniques() {
        let input: Vec<u8> = (0..64).map(|i| (i % 16) as u8 * 17).collect();
        assert_eq!(roundtrip(&input), 4 + 128 + 63 * 4);
    }

    #[test]
    fn test_rejects_seventeen_uniques() {
        let input: Vec<u8> = (0..64).map(|i| (i % 17) as u8).collect();
        let table = SymbolTable::from_bytes(&input);
        assert!(encode(&input, &table).is_none());
    }

    #[test]
    fn test_corrupt_rank_is_rejected() {
        // Three uniques at 2 bits per rank leave rank 3 unused
        let mut writer = BitWriter::new();
        writer.write_bits(2, 4);
        writer.write_bytes(b"abc");
        writer.write_bits(3, 2);
        let data = writer.into_vec();
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            decode(&mut reader, 2),
            Err(TinyError::StructuralDecode { .. })
        ));
    }
}
