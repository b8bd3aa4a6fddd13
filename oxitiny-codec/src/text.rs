//! Variable-length text coding.
//!
//! Bytes found in a 23-entry frequency table get a 3, 4, 5 or 7 bit code
//! by rank; anything else is escaped with a 3-bit marker and a literal.
//! The table is one of three profiles chosen by [`classify`].
//!
//! Codes, read LSB-first:
//!
//! | Ranks  | Bits | Values                 |
//! |--------|------|------------------------|
//! | 0-1    | 3    | `1`, `3`               |
//! | 2-3    | 4    | `7`, `15`              |
//! | 4-18   | 5    | even values `0..=28`   |
//! | 19-22  | 7    | `0x1e + 32 * k`        |
//! | escape | 3    | `5`, then 7/8 literal  |
//!
//! The code is prefix-free, so the decoder peeks 7 bits and resolves the
//! symbol and its length with a single table lookup.

use oxitiny_core::{BitReader, BitWriter, Result, TinyError};

use crate::symbols::high_bit_clear;
use crate::tables::{
    CODE_SIGNATURE, CODE_TEXT_CHARS, CODE_TEXT_INDEX, FREQUENT_TEXT, MARKUP_SIGNATURE,
    MARKUP_TEXT_CHARS, MARKUP_TEXT_INDEX, NOT_PRESENT, STANDARD_TEXT_CHARS, STANDARD_TEXT_INDEX,
    TEXT_TABLE_LEN,
};

/// Bits per code, indexed by rank.
const CODE_BITS: [u8; TEXT_TABLE_LEN] = [
    3, 3, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 7, 7, 7, 7,
];

/// Code values, indexed by rank.
const CODE_VALUES: [u8; TEXT_TABLE_LEN] = [
    1, 3, 7, 15, 0, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 26, 28, 0x1e, 0x3e, 0x5e, 0x7e,
];

const ESCAPE_VALUE: u32 = 5;
const ESCAPE_BITS: u8 = 3;
const PEEK_BITS: u8 = 7;

/// Symbol id the decode table uses for the escape marker.
const ESCAPE: u8 = TEXT_TABLE_LEN as u8;

/// `(symbol, code length)` for every 7-bit lookahead.
const DECODE_TABLE: [(u8, u8); 1 << PEEK_BITS] = build_decode_table();

const fn build_decode_table() -> [(u8, u8); 1 << PEEK_BITS] {
    let mut table = [(0u8, 0u8); 1 << PEEK_BITS];
    let mut symbol = 0;
    while symbol <= TEXT_TABLE_LEN {
        let (value, bits) = if symbol == TEXT_TABLE_LEN {
            (ESCAPE_VALUE as usize, ESCAPE_BITS)
        } else {
            (CODE_VALUES[symbol] as usize, CODE_BITS[symbol])
        };
        let mut high = 0;
        while high < 1 << (PEEK_BITS - bits) {
            table[(high << bits) | value] = (symbol as u8, bits);
            high += 1;
        }
        symbol += 1;
    }
    table
}

/// Character profile selecting the frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextProfile {
    /// Natural-language prose.
    Standard,
    /// Markup such as XML or HTML.
    Markup,
    /// Program source code.
    Code,
}

impl TextProfile {
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Standard),
            1 => Some(Self::Markup),
            2 => Some(Self::Code),
            _ => None,
        }
    }

    fn bits(self) -> u32 {
        match self {
            Self::Standard => 0,
            Self::Markup => 1,
            Self::Code => 2,
        }
    }

    /// Frequency-ordered characters of this profile.
    pub fn chars(self) -> &'static [u8; TEXT_TABLE_LEN] {
        match self {
            Self::Standard => &STANDARD_TEXT_CHARS,
            Self::Markup => &MARKUP_TEXT_CHARS,
            Self::Code => &CODE_TEXT_CHARS,
        }
    }

    fn index(self) -> &'static [u8; 256] {
        match self {
            Self::Standard => &STANDARD_TEXT_INDEX,
            Self::Markup => &MARKUP_TEXT_INDEX,
            Self::Code => &CODE_TEXT_INDEX,
        }
    }
}

/// Pick a profile from the character make-up of `input`.
///
/// Blocks made almost entirely of frequent prose characters stay on the
/// standard table. Otherwise a small count of markup or code signature
/// characters (2 below 24 bytes, 3 from there) switches tables.
pub fn classify(input: &[u8]) -> TextProfile {
    let n = input.len();
    let frequent = input.iter().filter(|&&b| FREQUENT_TEXT[b as usize]).count();
    if frequent * 8 >= n * 7 {
        return TextProfile::Standard;
    }

    let min_count = if n < 24 { 2 } else { 3 };
    let markup = input.iter().filter(|&&b| MARKUP_SIGNATURE[b as usize]).count();
    if markup >= min_count {
        return TextProfile::Markup;
    }
    let code = input.iter().filter(|&&b| CODE_SIGNATURE[b as usize]).count();
    if code >= min_count {
        return TextProfile::Code;
    }
    TextProfile::Standard
}

/// Encode `input` with `profile`, giving up as soon as the payload passes `max_bits`.
pub fn encode(input: &[u8], profile: TextProfile, max_bits: usize) -> Option<BitWriter> {
    let seven_bit = high_bit_clear(input);
    let literal_bits = if seven_bit { 7 } else { 8 };
    let index = profile.index();

    let mut writer = BitWriter::with_capacity(max_bits.div_ceil(8));
    writer.write_bits(profile.bits(), 2);
    writer.write_bit(seven_bit);

    for &b in input {
        match index[b as usize] {
            NOT_PRESENT => {
                writer.write_bits(ESCAPE_VALUE, ESCAPE_BITS);
                writer.write_bits(b as u32, literal_bits);
            }
            rank => {
                let rank = rank as usize;
                writer.write_bits(CODE_VALUES[rank] as u32, CODE_BITS[rank]);
            }
        }
        if writer.bits_written() > max_bits {
            return None;
        }
    }
    Some(writer)
}

/// Decode a block of `n` bytes.
pub fn decode(reader: &mut BitReader<'_>, n: usize) -> Result<Vec<u8>> {
    let profile_bits = reader.read_bits(2)?;
    let profile = TextProfile::from_bits(profile_bits).ok_or_else(|| {
        TinyError::corrupted(
            reader.bit_position(),
            format!("unknown text profile {profile_bits}"),
        )
    })?;
    let literal_bits = if reader.read_bit()? { 7 } else { 8 };
    let chars = profile.chars();

    let mut output = Vec::with_capacity(n);
    while output.len() < n {
        let (symbol, bits) = DECODE_TABLE[reader.peek_bits(PEEK_BITS) as usize];
        reader.skip_bits(bits)?;
        if symbol == ESCAPE {
            output.push(reader.read_bits(literal_bits)? as u8);
        } else {
            output.push(chars[symbol as usize]);
        }
    }
    Ok(output)
}
