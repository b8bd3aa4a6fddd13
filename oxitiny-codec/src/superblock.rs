//! Superblock codec for 1 to 512 bytes.
//!
//! A superblock is self-describing: its header recovers the length, so a
//! stream of superblocks can be walked without a side table.
//!
//! # Header
//!
//! ```text
//! N <= 64        byte 0: [pass:1][N-1:6][0]
//! N >= 65        byte 0: [excess low:6][class:1][1]
//!                byte 1: [flags:4][region:2][excess high:2]
//!   N <= 256     flags = four pass bits
//!   N >  256     flags = [pass:2][wide:1][consumed bit 8:1]
//!                byte 2 (wide only): eight pass bits
//! ```
//!
//! The class selects 65..=320 or 321..=512 and the excess is the offset
//! inside it. The region selects plain 64-byte splitting, a whole-region
//! text payload, or a whole-region string payload. A string region is
//! followed by one byte holding the low bits of its consumed length minus
//! one. Pass bits are ordered as follows: the region bit first (if any),
//! then one bit per 64-byte sub-block of the remainder. A cleared pass bit
//! means the unit is stored raw.

use log::debug;
use oxitiny_core::{BitReader, Result, TinyError};

use crate::block::{self, MAX_BLOCK_LEN};
use crate::config::{CodecConfig, Effort};
use crate::mode::Encoded;
use crate::string::{self, StringVariant};
use crate::symbols::SymbolTable;
use crate::tables::{FREQUENT_TEXT, PROSE_CHARS};
use crate::text;

/// Largest superblock.
pub const MAX_SUPERBLOCK_LEN: usize = 512;

/// Top-level treatment of a superblock longer than 64 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionMode {
    /// Split into 64-byte blocks.
    Blocks,
    /// Whole superblock text coded.
    Text,
    /// A string-coded prefix, then 64-byte blocks.
    String,
}

impl RegionMode {
    fn bits(self) -> u8 {
        match self {
            Self::Blocks => 0,
            Self::Text => 1,
            Self::String => 2,
        }
    }

    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Blocks),
            1 => Some(Self::Text),
            2 => Some(Self::String),
            _ => None,
        }
    }
}

/// Parsed superblock header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperblockHeader {
    /// Number of bytes the superblock decodes to.
    pub len: usize,
    /// Region treatment (always `Blocks` at 64 bytes or less).
    pub region: RegionMode,
    /// Pass bits, first unit in bit 0.
    pub pass: u8,
    /// Whether a third header byte carries the pass bits.
    pub wide: bool,
    /// Bit 8 of a string region's consumed length minus one.
    pub consumed_high: bool,
}

impl SuperblockHeader {
    /// Build a header for `len` bytes whose units use `units` pass bits.
    pub fn new(len: usize, region: RegionMode, pass: u8, units: usize) -> Self {
        Self {
            len,
            region,
            pass,
            wide: len > 256 && units > 2,
            consumed_high: false,
        }
    }

    /// Number of header bytes.
    pub fn byte_len(&self) -> usize {
        match self.len {
            0..=64 => 1,
            65..=256 => 2,
            _ if self.wide => 3,
            _ => 2,
        }
    }

    /// Number of pass bits the header holds.
    pub fn capacity(&self) -> usize {
        match self.len {
            0..=64 => 1,
            65..=256 => 4,
            _ if self.wide => 8,
            _ => 2,
        }
    }

    /// Whether unit `index` was compressed.
    pub fn passed(&self, index: usize) -> bool {
        index < 8 && self.pass & (1 << index) != 0
    }

    /// Append the header bytes to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        if self.len <= 64 {
            out.push((((self.len - 1) as u8) << 1) | ((self.pass & 1) << 7));
            return;
        }

        let (class, excess) = if self.len > 320 {
            (1u8, self.len - 321)
        } else {
            (0u8, self.len - 65)
        };
        let excess = excess as u8;
        out.push(1 | (class << 1) | ((excess & 0x3F) << 2));

        let mut second = (excess >> 6) | (self.region.bits() << 2);
        if self.len <= 256 {
            second |= (self.pass & 0x0F) << 4;
            out.push(second);
            return;
        }

        second |= (self.consumed_high as u8) << 4;
        second |= (self.wide as u8) << 5;
        if self.wide {
            out.push(second);
            out.push(self.pass);
        } else {
            second |= (self.pass & 0x03) << 6;
            out.push(second);
        }
    }

    /// Parse a header from the start of `input`.
    ///
    /// Returns the header and its length in bytes.
    pub fn parse(input: &[u8]) -> Result<(Self, usize)> {
        let first = *input.first().ok_or_else(|| TinyError::unexpected_eof(0))?;

        if first & 1 == 0 {
            let header = Self {
                len: ((first >> 1) & 0x3F) as usize + 1,
                region: RegionMode::Blocks,
                pass: first >> 7,
                wide: false,
                consumed_high: false,
            };
            return Ok((header, 1));
        }

        let second = *input.get(1).ok_or_else(|| TinyError::unexpected_eof(8))?;
        let excess = ((first >> 2) as usize) | (((second & 0x03) as usize) << 6);
        let len = if first & 0x02 != 0 { 321 + excess } else { 65 + excess };
        if len > MAX_SUPERBLOCK_LEN {
            return Err(TinyError::corrupted(0, format!("superblock length {len}")));
        }

        let region_bits = (second >> 2) & 0x03;
        let region = RegionMode::from_bits(region_bits)
            .ok_or_else(|| TinyError::corrupted(1, format!("unknown region mode {region_bits}")))?;

        if len <= 256 {
            let header = Self {
                len,
                region,
                pass: second >> 4,
                wide: false,
                consumed_high: false,
            };
            return Ok((header, 2));
        }

        let consumed_high = second & 0x10 != 0;
        let wide = second & 0x20 != 0;
        if wide {
            let pass = *input.get(2).ok_or_else(|| TinyError::unexpected_eof(16))?;
            Ok((
                Self {
                    len,
                    region,
                    pass,
                    wide,
                    consumed_high,
                },
                3,
            ))
        } else {
            Ok((
                Self {
                    len,
                    region,
                    pass: second >> 6,
                    wide,
                    consumed_high,
                },
                2,
            ))
        }
    }
}

/// Pass bits and bytes for a run of 64-byte sub-blocks.
struct UnitWriter {
    pass: u8,
    units: usize,
    payload: Vec<u8>,
}

impl UnitWriter {
    fn new(capacity: usize) -> Self {
        Self {
            pass: 0,
            units: 0,
            payload: Vec::with_capacity(capacity),
        }
    }

    fn push_compressed(&mut self, data: &[u8]) {
        self.pass |= 1 << self.units;
        self.units += 1;
        self.payload.extend_from_slice(data);
    }

    fn push_raw(&mut self, data: &[u8]) {
        self.units += 1;
        self.payload.extend_from_slice(data);
    }

    fn push_blocks(&mut self, input: &[u8], config: &CodecConfig) -> Result<()> {
        for chunk in input.chunks(MAX_BLOCK_LEN) {
            match block::encode(chunk, config)? {
                Encoded::Compressed { data, .. } => self.push_compressed(&data),
                Encoded::NotApplicable => self.push_raw(chunk),
            }
        }
        Ok(())
    }

    fn finish(self, len: usize, region: RegionMode, consumed_high: bool) -> Vec<u8> {
        let mut header = SuperblockHeader::new(len, region, self.pass, self.units);
        header.consumed_high = consumed_high;

        let mut out = Vec::with_capacity(header.byte_len() + self.payload.len());
        header.write(&mut out);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Encode 1 to 512 bytes as one superblock.
///
/// # Example
///
/// ```rust
/// use oxitiny_codec::superblock;
/// use oxitiny_codec::CodecConfig;
///
/// let input = b"superblocks store their own length".repeat(8);
/// let encoded = superblock::encode(&input, &CodecConfig::default()).unwrap();
/// assert!(encoded.len() < input.len());
///
/// let (decoded, consumed) = superblock::decode(&encoded).unwrap();
/// assert_eq!(decoded, input);
/// assert_eq!(consumed, encoded.len());
/// ```
pub fn encode(input: &[u8], config: &CodecConfig) -> Result<Vec<u8>> {
    let n = input.len();
    if n == 0 || n > MAX_SUPERBLOCK_LEN {
        return Err(TinyError::invalid_length(n, MAX_SUPERBLOCK_LEN));
    }

    if n <= MAX_BLOCK_LEN {
        let mut units = UnitWriter::new(n);
        units.push_blocks(input, config)?;
        return Ok(units.finish(n, RegionMode::Blocks, false));
    }

    let thorough = config.effort == Effort::Thorough;
    let whole_region = n >= config.min_region_len;
    let mut best: Option<Vec<u8>> = None;

    if whole_region && (thorough || looks_like_prose(input)) {
        if let Some(encoded) = encode_text_region(input) {
            debug!("superblock of {n} bytes: text region, {} bytes", encoded.len());
            if !thorough {
                return Ok(encoded);
            }
            best = Some(encoded);
        }
    }

    if whole_region && (thorough || !prefers_blocks(input, config)?) {
        if let Some(encoded) = encode_string_region(input, config)? {
            debug!("superblock of {n} bytes: string region, {} bytes", encoded.len());
            if !thorough {
                return Ok(encoded);
            }
            best = Some(smaller(best, encoded));
        }
    }

    let mut units = UnitWriter::new(n);
    units.push_blocks(input, config)?;
    let encoded = units.finish(n, RegionMode::Blocks, false);
    debug!("superblock of {n} bytes: blocks, {} bytes", encoded.len());
    Ok(smaller(best, encoded))
}

/// The shorter of two encodings, keeping `best` on a tie.
fn smaller(best: Option<Vec<u8>>, candidate: Vec<u8>) -> Vec<u8> {
    match best {
        Some(best) if best.len() <= candidate.len() => best,
        _ => candidate,
    }
}

/// Whether the leading bytes look like plain prose worth a whole-region text trial.
fn looks_like_prose(input: &[u8]) -> bool {
    const SAMPLE: usize = 96;
    if input.len() < SAMPLE || input[..16].iter().any(|&b| b & 0x80 != 0) {
        return false;
    }

    let sample = &input[..SAMPLE];
    let prose = sample.iter().filter(|&&b| PROSE_CHARS[b as usize]).count();
    let frequent = sample.iter().filter(|&&b| FREQUENT_TEXT[b as usize]).count();
    prose >= 90 && frequent >= 72
}

/// Whether the first 64 bytes are better served by the block codec than by
/// a whole-region string encoding.
fn prefers_blocks(input: &[u8], config: &CodecConfig) -> Result<bool> {
    let head = &input[..MAX_BLOCK_LEN];
    let table = SymbolTable::from_bytes(head);
    let uniques = table.len();
    if uniques > 40 || uniques <= 2 {
        return Ok(true);
    }

    let most = table
        .uniques()
        .iter()
        .map(|&v| table.count(v))
        .max()
        .unwrap_or(0);
    if most >= 36 {
        return Ok(true);
    }

    if most >= 19 && uniques > 14 {
        let Some(string_encoding) = string::encode(
            head,
            StringVariant::extended(head.len()),
            head.len() * 8,
        ) else {
            return Ok(true);
        };
        let block_bytes = match block::encode(head, config)? {
            Encoded::Compressed { data, .. } => data.len(),
            Encoded::NotApplicable => head.len(),
        };
        return Ok(block_bytes < string_encoding.payload.byte_len());
    }

    Ok(false)
}

fn encode_text_region(input: &[u8]) -> Option<Vec<u8>> {
    let n = input.len();
    let max_bits = (n - n / 16) * 8;
    let payload = text::encode(input, text::classify(input), max_bits)?;

    let mut units = UnitWriter::new(payload.byte_len());
    units.push_compressed(&payload.into_vec());
    Some(units.finish(n, RegionMode::Text, false))
}

fn encode_string_region(input: &[u8], config: &CodecConfig) -> Result<Option<Vec<u8>>> {
    let n = input.len();
    let Some(encoding) = string::encode(input, StringVariant::extended(n), n * 8) else {
        return Ok(None);
    };

    let consumed = encoding.consumed;
    // One byte of consumed length plus the payload must beat the raw prefix
    if encoding.payload.byte_len() + 1 >= consumed {
        return Ok(None);
    }

    let mut units = UnitWriter::new(n);
    units.payload.push(((consumed - 1) & 0xFF) as u8);
    units.push_compressed(&encoding.payload.into_vec());
    units.push_blocks(&input[consumed..], config)?;

    let capacity = SuperblockHeader::new(n, RegionMode::String, 0, units.units).capacity();
    if units.units > capacity {
        return Ok(None);
    }
    Ok(Some(units.finish(n, RegionMode::String, consumed - 1 > 0xFF)))
}

/// Decode one superblock from the start of `input`.
///
/// Returns the decoded bytes and the number of input bytes the superblock
/// occupied.
pub fn decode(input: &[u8]) -> Result<(Vec<u8>, usize)> {
    let (header, mut pos) = SuperblockHeader::parse(input)?;
    let n = header.len;
    let mut output = Vec::with_capacity(n);
    let mut unit = 0;

    match header.region {
        RegionMode::Blocks => {}
        RegionMode::Text => {
            if header.passed(0) {
                let mut reader = BitReader::new(input.get(pos..).unwrap_or_default());
                output = text::decode(&mut reader, n)?;
                pos += reader.bytes_consumed();
            } else {
                output.extend_from_slice(raw(input, pos, n)?);
                pos += n;
            }
            unit = 1;
        }
        RegionMode::String => {
            let low = *input.get(pos).ok_or_else(|| TinyError::unexpected_eof(pos * 8))?;
            pos += 1;
            let consumed = low as usize + 1 + if header.consumed_high { 256 } else { 0 };
            if consumed > n {
                return Err(TinyError::corrupted(
                    pos - 1,
                    format!("string region of {consumed} bytes in superblock of {n}"),
                ));
            }
            if header.passed(0) {
                let mut reader = BitReader::new(input.get(pos..).unwrap_or_default());
                output = string::decode(&mut reader, consumed, StringVariant::extended(n))?;
                pos += reader.bytes_consumed();
            } else {
                output.extend_from_slice(raw(input, pos, consumed)?);
                pos += consumed;
            }
            unit = 1;
        }
    }

    while output.len() < n {
        if unit >= header.capacity() {
            return Err(TinyError::corrupted(
                0,
                format!("superblock of {n} bytes needs more than {unit} pass bits"),
            ));
        }
        let len = (n - output.len()).min(MAX_BLOCK_LEN);
        if header.passed(unit) {
            let (block, used) = block::decode(input.get(pos..).unwrap_or_default(), len)?;
            output.extend_from_slice(&block);
            pos += used;
        } else {
            output.extend_from_slice(raw(input, pos, len)?);
            pos += len;
        }
        unit += 1;
    }

    if output.len() != n {
        return Err(TinyError::corrupted(
            pos,
            format!("decoded {} bytes, header says {n}", output.len()),
        ));
    }
    Ok((output, pos))
}

fn raw(input: &[u8], pos: usize, len: usize) -> Result<&[u8]> {
    input
        .get(pos..pos + len)
        .ok_or_else(|| TinyError::unexpected_eof(input.len() * 8))
}
