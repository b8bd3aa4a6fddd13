//! Case-enumerated coder for blocks of 1 to 5 bytes.
//!
//! Blocks this short cannot pay for a mode tag, so each length has a fixed
//! menu of layouts told apart by leading control bits:
//!
//! | Length | Layout                      | Control | Bits   |
//! |--------|-----------------------------|---------|--------|
//! | 1      | 4-bit text index            | none    | 4      |
//! | 2-5    | all bytes equal             | `1,0`   | 10     |
//! | 2-5    | text indexes (5th escaped)  | `1,1`   | 10-27  |
//! | 2-3    | two nibble values           | `0`     | 12-14  |
//! | 4-5    | two byte values             | `0`     | 20-21  |

use oxitiny_core::{BitReader, BitWriter, Result};

use crate::tables::{NOT_PRESENT, TINY_TEXT_CHARS, TINY_TEXT_INDEX};

/// Longest block handled by this coder.
pub const MAX_TINY_LEN: usize = 5;

/// Encode a block of 1 to 5 bytes, or `None` when no layout applies.
pub fn encode(input: &[u8]) -> Option<BitWriter> {
    let n = input.len();
    if n == 0 || n > MAX_TINY_LEN {
        return None;
    }

    let mut writer = BitWriter::with_capacity(4);

    if n == 1 {
        let index = text_index(input[0])?;
        writer.write_bits(index, 4);
        return Some(writer);
    }

    let first = input[0];
    if input.iter().all(|&b| b == first) {
        writer.write_bit(true);
        writer.write_bit(false);
        writer.write_byte(first);
        return Some(writer);
    }

    let text_prefix = input[..n.min(4)].iter().all(|&b| text_index(b).is_some());
    let all_text = text_prefix && (n < 5 || text_index(input[4]).is_some());

    if all_text {
        encode_text(input, &mut writer);
        return Some(writer);
    }

    if n <= 3 {
        return encode_nibbles(input, &mut writer).then_some(writer);
    }

    if encode_two_values(input, &mut writer) {
        return Some(writer);
    }

    if n == 5 && text_prefix {
        // The fifth byte escapes to a literal
        writer = BitWriter::with_capacity(4);
        encode_text(input, &mut writer);
        return Some(writer);
    }

    None
}

fn text_index(byte: u8) -> Option<u32> {
    match TINY_TEXT_INDEX[byte as usize] {
        NOT_PRESENT => None,
        index => Some(index as u32),
    }
}

fn encode_text(input: &[u8], writer: &mut BitWriter) {
    writer.write_bit(true);
    writer.write_bit(true);
    for &b in input.iter().take(4) {
        writer.write_bits(text_index(b).unwrap_or(0), 4);
    }
    if let Some(&fifth) = input.get(4) {
        match text_index(fifth) {
            Some(index) => {
                writer.write_bit(true);
                writer.write_bits(index, 4);
            }
            None => {
                writer.write_bit(false);
                writer.write_byte(fifth);
            }
        }
    }
}

/// Every nibble is one of two values; the first nibble is the high half of byte 0.
fn encode_nibbles(input: &[u8], writer: &mut BitWriter) -> bool {
    let nibbles: Vec<u8> = input.iter().flat_map(|&b| [b >> 4, b & 0x0F]).collect();
    let base = nibbles[0];
    let other = nibbles.iter().copied().find(|&v| v != base).unwrap_or(0);
    if nibbles.iter().any(|&v| v != base && v != other) {
        return false;
    }

    writer.write_bit(false);
    for &v in &nibbles[1..] {
        writer.write_bit(v == other && v != base);
    }
    writer.write_bits(base as u32, 4);
    writer.write_bits(other as u32, 4);
    true
}

/// Exactly two distinct byte values.
fn encode_two_values(input: &[u8], writer: &mut BitWriter) -> bool {
    let base = input[0];
    let Some(other) = input.iter().copied().find(|&v| v != base) else {
        return false;
    };
    if input.iter().any(|&v| v != base && v != other) {
        return false;
    }

    writer.write_bit(false);
    for &v in &input[1..] {
        writer.write_bit(v == other);
    }
    writer.write_byte(base);
    writer.write_byte(other);
    true
}

/// Decode a block of `n` (1 to 5) bytes.
pub fn decode(reader: &mut BitReader<'_>, n: usize) -> Result<Vec<u8>> {
    debug_assert!((1..=MAX_TINY_LEN).contains(&n));

    if n == 1 {
        let index = reader.read_bits(4)? as usize;
        return Ok(vec![TINY_TEXT_CHARS[index]]);
    }

    if reader.read_bit()? {
        if !reader.read_bit()? {
            let value = reader.read_byte()?;
            return Ok(vec![value; n]);
        }

        let mut output = Vec::with_capacity(n);
        for _ in 0..n.min(4) {
            output.push(TINY_TEXT_CHARS[reader.read_bits(4)? as usize]);
        }
        if n == 5 {
            let fifth = if reader.read_bit()? {
                TINY_TEXT_CHARS[reader.read_bits(4)? as usize]
            } else {
                reader.read_byte()?
            };
            output.push(fifth);
        }
        return Ok(output);
    }

    if n <= 3 {
        let mut flags = [false; 2 * 3];
        for flag in flags.iter_mut().take(2 * n - 1) {
            *flag = reader.read_bit()?;
        }
        let base = reader.read_bits(4)? as u8;
        let other = reader.read_bits(4)? as u8;

        let nibble = |i: usize| {
            if i > 0 && flags[i - 1] { other } else { base }
        };
        return Ok((0..n)
            .map(|i| (nibble(2 * i) << 4) | nibble(2 * i + 1))
            .collect());
    }

    let mut flags = [false; MAX_TINY_LEN - 1];
    for flag in flags.iter_mut().take(n - 1) {
        *flag = reader.read_bit()?;
    }
    let base = reader.read_byte()?;
    let other = reader.read_byte()?;

    let mut output = Vec::with_capacity(n);
    output.push(base);
    output.extend(flags[..n - 1].iter().map(|&f| if f { other } else { base }));
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u8]) -> Option<usize> {
        let writer = encode(input)?;
        let bits = writer.bits_written();
        let data = writer.into_vec();
        let mut reader = BitReader::new(&data);
        let decoded = decode(&mut reader, input.len()).unwrap();
        assert_eq!(decoded, input, "roundtrip failed for {:02x?}", input);
        assert_eq!(reader.bit_position(), bits);
        Some(bits)
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(roundtrip(b"e"), Some(4));
        assert_eq!(roundtrip(b" "), Some(4));
        assert_eq!(roundtrip(b"z"), None);
        assert_eq!(roundtrip(&[0x00]), None);
    }

    #[test]
    fn test_all_equal() {
        assert_eq!(roundtrip(&[0x7F, 0x7F]), Some(10));
        assert_eq!(roundtrip(&[0xFF; 5]), Some(10));
    }

    #[test]
    fn test_text() {
        assert_eq!(roundtrip(b"at"), Some(10));
        assert_eq!(roundtrip(b"the"), Some(14));
        assert_eq!(roundtrip(b"rice"), Some(18));
        assert_eq!(roundtrip(b"notes"), Some(23));
    }

    #[test]
    fn test_text_with_escaped_fifth() {
        assert_eq!(roundtrip(b"hats!"), Some(27));
    }

    #[test]
    fn test_two_values_preferred_over_escape() {
        // "eeeeZ" has two distinct values, which is cheaper than escaping
        assert_eq!(roundtrip(b"eeeeZ"), Some(21));
    }

    #[test]
    fn test_nibbles() {
        assert_eq!(roundtrip(&[0x12, 0x21]), Some(12));
        assert_eq!(roundtrip(&[0x33, 0x3A, 0xA3]), Some(14));
        assert_eq!(roundtrip(&[0x12, 0x34]), None);
    }

    #[test]
    fn test_two_values() {
        assert_eq!(roundtrip(&[0x00, 0xFF, 0x00, 0xFF]), Some(20));
        assert_eq!(roundtrip(&[0x80, 0x80, 0x01, 0x80, 0x01]), Some(21));
        assert_eq!(roundtrip(&[0x00, 0x01, 0x02, 0x03]), None);
    }

    #[test]
    fn test_every_two_byte_pair_roundtrips_or_declines() {
        for a in (0..=255u8).step_by(7) {
            for b in (0..=255u8).step_by(11) {
                roundtrip(&[a, b]);
            }
        }
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(encode(&[]).is_none());
        assert!(encode(&[0u8; 6]).is_none());
    }
}
