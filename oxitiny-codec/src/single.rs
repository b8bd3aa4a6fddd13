//! Single-value coding for blocks dominated by one byte value.
//!
//! Layout: a 7-bit flag for the other bytes, the dominant value, one mask
//! bit per position (set where the dominant value sits), then the other
//! bytes in order. With at least [`MIN_PACKED_OTHERS`] other bytes, a flag
//! bit follows the mask and the other bytes may be string coded instead of
//! stored as literals.

use oxitiny_core::{BitReader, BitWriter, Result, TinyError};

use crate::string::{self, StringVariant};
use crate::symbols::high_bit_clear;

/// Fewest other bytes for which string coding of them is considered.
pub const MIN_PACKED_OTHERS: usize = 16;

/// Exact payload size in bits when the other bytes are stored as literals.
pub fn literal_payload_bits(n: usize, others: usize, seven_bit: bool) -> usize {
    let flag = (others >= MIN_PACKED_OTHERS) as usize;
    1 + 8 + n + flag + others * if seven_bit { 7 } else { 8 }
}

/// Encode `input` around the dominant `value`.
///
/// With `pack_others`, the bytes that are not `value` are also tried with
/// the extended string coder and the smaller form is kept.
pub fn encode(input: &[u8], value: u8, pack_others: bool) -> BitWriter {
    let others: Vec<u8> = input.iter().copied().filter(|&b| b != value).collect();
    let seven_bit = high_bit_clear(&others);
    let literal_bits = if seven_bit { 7 } else { 8 };

    let mut writer = BitWriter::with_capacity(input.len());
    writer.write_bit(seven_bit);
    writer.write_byte(value);
    for &b in input {
        writer.write_bit(b == value);
    }

    if others.len() >= MIN_PACKED_OTHERS {
        let literal_total = others.len() * literal_bits as usize;
        let packed = pack_others
            .then(|| {
                string::encode(
                    &others,
                    StringVariant::extended(others.len()),
                    literal_total.saturating_sub(1),
                )
            })
            .flatten()
            .filter(|encoding| !encoding.is_partial(others.len()));

        writer.write_bit(packed.is_some());
        if let Some(encoding) = packed {
            writer.append(&encoding.payload);
            return writer;
        }
    }

    for &b in &others {
        writer.write_bits(b as u32, literal_bits);
    }
    writer
}

/// Decode a block of `n` bytes.
pub fn decode(reader: &mut BitReader<'_>, n: usize) -> Result<Vec<u8>> {
    let literal_bits = if reader.read_bit()? { 7 } else { 8 };
    let value = reader.read_byte()?;

    let mut mask = [false; 64];
    let mask = &mut mask[..n.min(64)];
    for bit in mask.iter_mut() {
        *bit = reader.read_bit()?;
    }
    let other_count = mask.iter().filter(|&&m| !m).count();

    let packed = other_count >= MIN_PACKED_OTHERS && reader.read_bit()?;
    let others = if packed {
        string::decode(reader, other_count, StringVariant::extended(other_count))?
    } else {
        (0..other_count)
            .map(|_| Ok(reader.read_bits(literal_bits)? as u8))
            .collect::<Result<Vec<u8>>>()?
    };

    merge(mask, value, others, reader.bit_position())
}

/// Interleave the dominant value and the other bytes according to `mask`.
fn merge(mask: &[bool], value: u8, others: Vec<u8>, bit_position: usize) -> Result<Vec<u8>> {
    let expected = mask.iter().filter(|&&m| !m).count();
    if others.len() != expected {
        return Err(TinyError::corrupted(
            bit_position,
            format!("{} other bytes for {expected} mask gaps", others.len()),
        ));
    }

    let mut others = others.into_iter();
    let mut output = Vec::with_capacity(mask.len());
    for &is_value in mask {
        if is_value {
            output.push(value);
        } else if let Some(other) = others.next() {
            output.push(other);
        }
    }
    Ok(output)
}
