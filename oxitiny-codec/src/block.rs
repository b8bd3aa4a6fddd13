//! Block codec for 1 to 64 bytes.
//!
//! Mode selection runs a short state machine over the block:
//!
//! 1. Blocks of up to 5 bytes go to the tiny coder.
//! 2. A prefix (half the block below 24 bytes, 7/16 from there) is scanned
//!    into a [`SymbolTable`].
//! 3. A prefix that is already nearly all distinct and has high-bit bytes
//!    is rejected as random.
//! 4. A text-heavy prefix triggers a text coding trial over the whole block.
//! 5. The scan resumes, watching for a value that repeats often enough to
//!    make single-value coding worthwhile.
//! 6. The unique count then picks an ordered list of candidate coders; the
//!    first one that shrinks the block wins.
//!
//! Every mode except the tiny coder starts with a 3-bit tag.

use log::trace;
use oxitiny_core::{BitReader, BitWriter, Result, TinyError};

use crate::config::CodecConfig;
use crate::fixed;
use crate::mode::{BlockMode, Encoded, TAG_BITS};
use crate::seven;
use crate::single;
use crate::string::{self, StringVariant};
use crate::symbols::{SymbolTable, high_bit_clear};
use crate::tables::UNIQUE_LIMITS;
use crate::text;
use crate::tiny::{self, MAX_TINY_LEN};

/// Largest block the block codec accepts.
pub const MAX_BLOCK_LEN: usize = 64;

/// One entry of the ordered fallback list.
#[derive(Debug, Clone, Copy)]
enum Candidate {
    SingleValue { value: u8, pack_others: bool },
    FixedWidth,
    BoundedString { max_bits: usize },
    SevenBit,
}

/// Encode a block of 1 to 64 bytes.
///
/// Returns [`Encoded::NotApplicable`] when no mode produces fewer bytes
/// than the input; the caller then stores the block raw.
///
/// # Example
///
/// ```rust
/// use oxitiny_codec::block;
/// use oxitiny_codec::{BlockMode, CodecConfig};
///
/// let input = [0x41u8; 64];
/// let encoded = block::encode(&input, &CodecConfig::default()).unwrap();
/// assert_eq!(encoded.mode(), Some(BlockMode::FixedWidth));
/// assert_eq!(encoded.data().unwrap().len(), 2);
///
/// let (decoded, consumed) = block::decode(encoded.data().unwrap(), 64).unwrap();
/// assert_eq!(decoded, input);
/// assert_eq!(consumed, 2);
/// ```
pub fn encode(input: &[u8], config: &CodecConfig) -> Result<Encoded> {
    let n = input.len();
    if n == 0 || n > MAX_BLOCK_LEN {
        return Err(TinyError::invalid_length(n, MAX_BLOCK_LEN));
    }

    let Some((mode, payload)) = select(input, config) else {
        trace!("block of {n} bytes: stored raw");
        return Ok(Encoded::NotApplicable);
    };

    let mut writer = BitWriter::with_capacity(n);
    if let Some(tag) = mode.tag() {
        writer.write_bits(tag, TAG_BITS);
    }
    writer.append(&payload);

    let bits = writer.bits_written();
    if writer.byte_len() >= n {
        trace!("block of {n} bytes: {mode} gave {bits} bits, stored raw");
        return Ok(Encoded::NotApplicable);
    }

    trace!("block of {n} bytes: {mode} in {bits} bits");
    Ok(Encoded::Compressed {
        mode,
        bits,
        data: writer.into_vec(),
    })
}

/// Largest payload (after the tag) that still saves at least one byte.
fn payload_budget(n: usize) -> usize {
    ((n - 1) * 8).saturating_sub(TAG_BITS as usize)
}

fn select(input: &[u8], config: &CodecConfig) -> Option<(BlockMode, BitWriter)> {
    let n = input.len();
    if n <= MAX_TINY_LEN {
        return tiny::encode(input).map(|payload| (BlockMode::Tiny, payload));
    }

    let prefix = if n < 24 { n / 2 } else { n * 7 / 16 };
    let mut table = SymbolTable::new();
    table.scan(input, prefix);

    if table.len() > (prefix - prefix / 8).saturating_sub(1) && table.high_bit_seen() {
        trace!("block of {n} bytes: prefix looks random");
        return None;
    }

    let unique_limit = UNIQUE_LIMITS[n] as usize;
    if table.len() > unique_limit / 2 && table.text_count() > prefix / 2 {
        let max_bits = ((n - n / 8) * 8)
            .saturating_sub(TAG_BITS as usize)
            .min(payload_budget(n));
        if let Some(payload) = text::encode(input, text::classify(input), max_bits) {
            return Some((BlockMode::Text, payload));
        }
    }

    let repeat_threshold = if n < 16 { n / 2 } else { n / 4 + 2 };
    let single_value = table.scan_until_repeat(input, repeat_threshold);
    if table.len() <= unique_limit {
        table.scan(input, n);
    }

    let seven_bit = n >= config.min_seven_bit_len && high_bit_clear(input);
    let mut candidates = Vec::with_capacity(3);

    if table.len() > unique_limit {
        if let Some(value) = single_value {
            candidates.push(Candidate::SingleValue {
                value,
                pack_others: true,
            });
        }
        let random_limit = (n * 3 / 4).min(StringVariant::BOUNDED.max_uniques);
        if table.len() <= random_limit && n >= config.min_string_block_len {
            let max_bits = if seven_bit { n * 7 } else { n * 8 - n / 4 - 1 };
            candidates.push(Candidate::BoundedString { max_bits });
        }
        if seven_bit {
            candidates.push(Candidate::SevenBit);
        }
    } else {
        if let Some(value) = single_value.filter(|_| table.len() > 1) {
            if single_beats_fixed(input, value, &table) {
                candidates.push(Candidate::SingleValue {
                    value,
                    pack_others: true,
                });
            }
        }
        candidates.push(Candidate::FixedWidth);
    }

    let budget = payload_budget(n);
    candidates.into_iter().find_map(|candidate| {
        attempt(candidate, input, &table).filter(|(_, payload)| payload.bits_written() <= budget)
    })
}

fn single_beats_fixed(input: &[u8], value: u8, table: &SymbolTable) -> bool {
    let n = input.len();
    let others = n - table.count(value);
    let single_bits = single::literal_payload_bits(n, others, false);
    single_bits < fixed::payload_bits(n, table.len())
}

fn attempt(
    candidate: Candidate,
    input: &[u8],
    table: &SymbolTable,
) -> Option<(BlockMode, BitWriter)> {
    match candidate {
        Candidate::SingleValue { value, pack_others } => Some((
            BlockMode::SingleValue,
            single::encode(input, value, pack_others),
        )),
        Candidate::FixedWidth => {
            fixed::encode(input, table).map(|payload| (BlockMode::FixedWidth, payload))
        }
        Candidate::BoundedString { max_bits } => {
            string::encode(input, StringVariant::BOUNDED, max_bits)
                .map(|encoding| (BlockMode::BoundedString, encoding.payload))
        }
        Candidate::SevenBit => seven::encode(input).map(|payload| (BlockMode::SevenBit, payload)),
    }
}

/// Decode a block of `n` bytes from the start of `input`.
///
/// Returns the block and the number of input bytes it occupied.
pub fn decode(input: &[u8], n: usize) -> Result<(Vec<u8>, usize)> {
    if n == 0 || n > MAX_BLOCK_LEN {
        return Err(TinyError::invalid_length(n, MAX_BLOCK_LEN));
    }

    let mut reader = BitReader::new(input);
    let output = match read_mode(&mut reader, n)? {
        BlockMode::Tiny => tiny::decode(&mut reader, n)?,
        BlockMode::FixedWidth => fixed::decode(&mut reader, n)?,
        BlockMode::BoundedString => string::decode(&mut reader, n, StringVariant::BOUNDED)?,
        BlockMode::SevenBit => seven::decode(&mut reader, n)?,
        BlockMode::SingleValue => single::decode(&mut reader, n)?,
        BlockMode::Text => text::decode(&mut reader, n)?,
    };

    if output.len() != n {
        return Err(TinyError::corrupted(
            reader.bytes_consumed(),
            format!("decoded {} bytes, expected {n}", output.len()),
        ));
    }
    Ok((output, reader.bytes_consumed()))
}

/// Mode of an encoded block of `n` bytes.
pub fn mode_of(encoded: &[u8], n: usize) -> Result<BlockMode> {
    read_mode(&mut BitReader::new(encoded), n)
}

fn read_mode(reader: &mut BitReader<'_>, n: usize) -> Result<BlockMode> {
    if n <= MAX_TINY_LEN {
        return Ok(BlockMode::Tiny);
    }
    let tag = reader.read_bits(TAG_BITS)?;
    BlockMode::from_tag(tag)
        .ok_or_else(|| TinyError::corrupted(0, format!("unknown block mode tag {tag}")))
}
