//! Back-reference string coding over a small alphabet.
//!
//! The block is walked left to right and every position emits one token:
//!
//! - `0`: a value not seen before; it is the next entry of the unique list
//!   stored in the header.
//! - `1,0` + index: a value seen before. The index width grows with the
//!   number of uniques seen so far.
//! - `1,1` + length + position: the next `L` bytes repeat the bytes that
//!   start at an earlier position `P`. The copy may overlap its own output.
//!
//! Position 0 is always the first unique and emits no token. Candidate
//! matches come from a pair index: per unique value, a bitmask of the
//! values that have followed it, plus the most recent position of every
//! such pair.
//!
//! Two variants exist. The bounded variant serves one 64-byte block with
//! at most 32 uniques. The extended variant serves up to 512 bytes with at
//! most 128 uniques, and stops early at a 129th unique, reporting how much
//! of the input it consumed.

use oxitiny_core::{BitReader, BitWriter, Result, TinyError, bits_for};

use crate::symbols::SymbolTable;

/// Shortest back-reference.
pub const MIN_MATCH: usize = 2;

/// Parameters of one string coder variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringVariant {
    /// Largest number of distinct values.
    pub max_uniques: usize,
    /// Longest back-reference.
    pub max_match: usize,
    /// Width of the `max_match - 2` length field.
    pub length_bits: u8,
    /// Width of the `uniques - 1` header field.
    pub count_bits: u8,
    /// Whether hitting `max_uniques` ends the encoding early instead of failing.
    pub allow_partial: bool,
}

impl StringVariant {
    /// Variant used inside a single block of at most 64 bytes.
    pub const BOUNDED: Self = Self {
        max_uniques: 32,
        max_match: 9,
        length_bits: 3,
        count_bits: 5,
        allow_partial: false,
    };

    /// Variant used on up to 512 bytes; match lengths grow to 17 past 64 bytes.
    pub fn extended(n: usize) -> Self {
        let long = n > 64;
        Self {
            max_uniques: 128,
            max_match: if long { 17 } else { 9 },
            length_bits: if long { 4 } else { 3 },
            count_bits: 7,
            allow_partial: true,
        }
    }

    /// Longest input this variant accepts.
    pub fn max_len(&self) -> usize {
        if self.allow_partial { 512 } else { 64 }
    }
}

/// Output of a string encode.
#[derive(Debug, Clone)]
pub struct StringEncoding {
    /// Number of leading input bytes covered by `payload`.
    pub consumed: usize,
    /// Encoded bits.
    pub payload: BitWriter,
}

impl StringEncoding {
    /// Whether the unique cap ended the encoding before the input did.
    pub fn is_partial(&self, n: usize) -> bool {
        self.consumed < n
    }
}

/// Most recent position of every (value, next value) pair, by rank.
struct PairIndex {
    /// Bit `b` of `followers[a]` is set once rank `b` has followed rank `a`.
    followers: Vec<u128>,
    positions: Vec<u16>,
    stride: usize,
}

impl PairIndex {
    fn new(max_uniques: usize) -> Self {
        debug_assert!(max_uniques <= 128);
        Self {
            followers: vec![0; max_uniques],
            positions: vec![0; max_uniques * max_uniques],
            stride: max_uniques,
        }
    }

    #[inline]
    fn record(&mut self, first: usize, second: usize, pos: usize) {
        self.followers[first] |= 1u128 << second;
        self.positions[first * self.stride + second] = pos as u16;
    }

    #[inline]
    fn lookup(&self, first: usize, second: usize) -> Option<usize> {
        if self.followers[first] & (1u128 << second) != 0 {
            Some(self.positions[first * self.stride + second] as usize)
        } else {
            None
        }
    }
}

/// Encode `input` with `variant`.
///
/// Returns `None` when the input is empty or too long for the variant,
/// when the bounded variant meets more than 32 uniques, or when the
/// payload grows past `max_bits`. The extended variant instead stops at
/// its unique cap and reports a `consumed` length below `input.len()`.
pub fn encode(input: &[u8], variant: StringVariant, max_bits: usize) -> Option<StringEncoding> {
    let n = input.len();
    if n == 0 || n > variant.max_len() {
        return None;
    }

    let mut table = SymbolTable::new();
    let mut pairs = PairIndex::new(variant.max_uniques);
    let mut tokens = BitWriter::with_capacity(n);
    let mut ranks = [0u8; 512];

    table.observe(input[0]);
    let mut consumed = n;
    let mut pos = 1;

    while pos < n {
        let byte = input[pos];
        let rank = match table.rank(byte) {
            Some(rank) => rank,
            None => {
                if table.len() == variant.max_uniques {
                    if !variant.allow_partial {
                        return None;
                    }
                    consumed = pos;
                    break;
                }
                tokens.write_bit(false);
                let (rank, _) = table.observe(byte);
                ranks[pos] = rank as u8;
                pairs.record(ranks[pos - 1] as usize, rank, pos - 1);
                pos += 1;
                continue;
            }
        };
        ranks[pos] = rank as u8;
        pairs.record(ranks[pos - 1] as usize, rank, pos - 1);

        let index_bits = bits_for(table.len()) as usize;
        if let Some((source, length)) = find_match(input, pos, rank, &table, &pairs, variant) {
            let copy_bits = 2 + variant.length_bits as usize + bits_for(pos) as usize;
            if copy_bits < length * (2 + index_bits) {
                tokens.write_bits(0b11, 2);
                tokens.write_bits((length - MIN_MATCH) as u32, variant.length_bits);
                tokens.write_bits(source as u32, bits_for(pos));
                for k in pos + 1..pos + length {
                    // Every byte inside a match is already a known unique
                    let next = table.rank(input[k]).unwrap_or(0);
                    ranks[k] = next as u8;
                    pairs.record(ranks[k - 1] as usize, next, k - 1);
                }
                pos += length;
                if tokens.bits_written() > max_bits {
                    return None;
                }
                continue;
            }
        }

        tokens.write_bits(0b01, 2);
        tokens.write_bits(rank as u32, index_bits as u8);
        pos += 1;
        if tokens.bits_written() > max_bits {
            return None;
        }
    }

    let uniques = table.uniques();
    let seven_bit = uniques.iter().all(|&u| u & 0x80 == 0);
    let literal_bits = if seven_bit { 7 } else { 8 };

    let mut payload = BitWriter::with_capacity(tokens.byte_len() + uniques.len() + 2);
    payload.write_bits(uniques.len() as u32 - 1, variant.count_bits);
    payload.write_bit(seven_bit);
    for &u in uniques {
        payload.write_bits(u as u32, literal_bits);
    }
    payload.append(&tokens);

    if payload.bits_written() > max_bits {
        return None;
    }
    Some(StringEncoding { consumed, payload })
}

/// Find the longest earlier run matching the input at `pos`.
///
/// Returns `(source position, length)`.
fn find_match(
    input: &[u8],
    pos: usize,
    rank: usize,
    table: &SymbolTable,
    pairs: &PairIndex,
    variant: StringVariant,
) -> Option<(usize, usize)> {
    let next_rank = table.rank(*input.get(pos + 1)?)?;
    let source = pairs.lookup(rank, next_rank)?;
    debug_assert!(source < pos);

    let mut length = MIN_MATCH;
    while length < variant.max_match
        && pos + length < input.len()
        && input[source + length] == input[pos + length]
    {
        length += 1;
    }
    Some((source, length))
}

/// Decode `n` bytes encoded with `variant`.
pub fn decode(reader: &mut BitReader<'_>, n: usize, variant: StringVariant) -> Result<Vec<u8>> {
    let unique_count = reader.read_bits(variant.count_bits)? as usize + 1;
    let literal_bits = if reader.read_bit()? { 7 } else { 8 };
    let mut uniques = [0u8; 128];
    for value in uniques.iter_mut().take(unique_count) {
        *value = reader.read_bits(literal_bits)? as u8;
    }

    let mut output = Vec::with_capacity(n);
    if n == 0 {
        return Ok(output);
    }
    output.push(uniques[0]);
    let mut seen = 1;

    while output.len() < n {
        if !reader.read_bit()? {
            if seen >= unique_count {
                return Err(TinyError::corrupted(
                    reader.bit_position(),
                    format!("more than {unique_count} new values"),
                ));
            }
            output.push(uniques[seen]);
            seen += 1;
        } else if !reader.read_bit()? {
            let index = reader.read_bits(bits_for(seen))? as usize;
            if index >= seen {
                return Err(TinyError::corrupted(
                    reader.bit_position(),
                    format!("repeat index {index} with {seen} values seen"),
                ));
            }
            output.push(uniques[index]);
        } else {
            let length = reader.read_bits(variant.length_bits)? as usize + MIN_MATCH;
            let pos = output.len();
            let source = reader.read_bits(bits_for(pos))? as usize;
            if source >= pos || pos + length > n {
                return Err(TinyError::corrupted(
                    reader.bit_position(),
                    format!("copy of {length} from {source} at {pos} exceeds block of {n}"),
                ));
            }
            // Byte by byte: the source may run into the bytes being produced
            for k in 0..length {
                let byte = output[source + k];
                output.push(byte);
            }
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u8], variant: StringVariant) -> StringEncoding {
        let encoding = encode(input, variant, usize::MAX).unwrap();
        let bits = encoding.payload.bits_written();
        let data = encoding.payload.clone().into_vec();
        let mut reader = BitReader::new(&data);
        let decoded = decode(&mut reader, encoding.consumed, variant).unwrap();
        assert_eq!(decoded, &input[..encoding.consumed]);
        assert_eq!(reader.bit_position(), bits);
        encoding
    }

    #[test]
    fn test_repetitive_text() {
        let input = b"TOBEORNOTTOBEORTOBEORNOTTOBEORNOTTOBEORTOBEORNOT";
        let encoding = roundtrip(input, StringVariant::BOUNDED);
        assert_eq!(encoding.consumed, input.len());
        assert!(encoding.payload.byte_len() < input.len() / 2);
    }

    #[test]
    fn test_overlapping_copy() {
        // "ab" then a long run that copies from itself
        let input = b"abababababababababababab";
        let encoding = roundtrip(input, StringVariant::BOUNDED);
        assert!(encoding.payload.byte_len() < 8);
    }

    #[test]
    fn test_single_run() {
        let encoding = roundtrip(&[7u8; 64], StringVariant::BOUNDED);
        // One literal, then seven overlapping copies of nine bytes
        assert_eq!(encoding.payload.bits_written(), 13 + 68);
    }

    #[test]
    fn test_all_new_values() {
        let input: Vec<u8> = (0..32u8).map(|i| i * 7).collect();
        roundtrip(&input, StringVariant::BOUNDED);
    }

    #[test]
    fn test_bounded_rejects_too_many_uniques() {
        let input: Vec<u8> = (0..33u8).collect();
        assert!(encode(&input, StringVariant::BOUNDED, usize::MAX).is_none());
        let long = [0u8; 65];
        assert!(encode(&long, StringVariant::BOUNDED, usize::MAX).is_none());
    }

    #[test]
    fn test_extended_long_matches() {
        let phrase = b"small alphabets compress well; ";
        let input: Vec<u8> = phrase.iter().copied().cycle().take(512).collect();
        let encoding = roundtrip(&input, StringVariant::extended(512));
        assert_eq!(encoding.consumed, 512);
        assert!(encoding.payload.byte_len() < 200);
    }

    #[test]
    fn test_extended_stops_at_unique_cap() {
        let mut input: Vec<u8> = (0..=128u8).collect();
        input.extend((0..512 - 129).map(|i| (i % 64) as u8));
        assert_eq!(input.len(), 512);

        let encoding = roundtrip(&input, StringVariant::extended(512));
        assert_eq!(encoding.consumed, 128);
        assert!(encoding.is_partial(512));
    }

    #[test]
    fn test_extended_high_bit_uniques() {
        let input: Vec<u8> = (0..300).map(|i| 0x80 | ((i * i) % 40) as u8).collect();
        let encoding = roundtrip(&input, StringVariant::extended(300));
        assert_eq!(encoding.consumed, 300);
    }

    #[test]
    fn test_max_bits_bails_out() {
        let input: Vec<u8> = (0..32u8).collect();
        assert!(encode(&input, StringVariant::BOUNDED, 64).is_none());
    }

    #[test]
    fn test_corrupt_copy_is_rejected() {
        let mut writer = BitWriter::new();
        writer.write_bits(0, 5); // one unique
        writer.write_bit(true); // 7-bit literals
        writer.write_bits(b'x' as u32, 7);
        writer.write_bits(0b11, 2); // copy
        writer.write_bits(0, 3); // length 2
        writer.write_bits(1, 1); // source 1 at position 1
        let data = writer.into_vec();

        let mut reader = BitReader::new(&data);
        assert!(matches!(
            decode(&mut reader, 3, StringVariant::BOUNDED),
            Err(TinyError::StructuralDecode { .. })
        ));
    }
}
