//! # OxiTiny Codec: Lossless Compression for Tiny Inputs
//!
//! This crate compresses inputs of 1 to 512 bytes, the range where general
//! purpose compressors lose to their own headers.
//!
//! ## Features
//!
//! - **Pure Rust**: No C dependencies, 100% safe Rust
//! - **Self-describing**: Every superblock header recovers its own length
//! - **Never expands by more than 3 bytes**: Incompressible units are stored raw
//! - **Mode selection**: Tiny, fixed-width, single-value, 7-bit, text and
//!   back-reference string coders compete per 64-byte block
//! - **Parallel**: Optional rayon-based chunk encoding (`parallel` feature)
//!
//! ## Layers
//!
//! - [`block`]: 1 to 64 bytes, picks one coder and prefixes a 3-bit tag
//! - [`superblock`]: 1 to 512 bytes, whole-region text or string coding,
//!   otherwise 64-byte blocks with one pass bit each
//! - [`stream`]: any length, cut into 512-byte superblocks
//!
//! ## Example
//!
//! ```rust
//! use oxitiny_codec::{CodecConfig, decode_block, encode_block};
//!
//! let original = [0x41u8; 64];
//!
//! let encoded = encode_block(&original, &CodecConfig::default()).unwrap();
//! assert_eq!(encoded.len(), 3);
//!
//! let (decoded, consumed) = decode_block(&encoded, original.len()).unwrap();
//! assert_eq!(decoded, original);
//! assert_eq!(consumed, encoded.len());
//! ```
//!
//! ## Buffers of any size
//!
//! ```rust
//! use oxitiny_codec::{compress, decompress, CodecConfig};
//!
//! let data = b"tiny blocks, tiny headers. ".repeat(50);
//! let compressed = compress(&data, &CodecConfig::default()).unwrap();
//! assert!(compressed.len() < data.len());
//! assert_eq!(decompress(&compressed).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod block;
pub mod config;
pub mod fixed;
pub mod mode;
pub mod seven;
pub mod single;
pub mod stream;
pub mod string;
pub mod superblock;
pub mod symbols;
pub mod tables;
pub mod text;
pub mod tiny;

pub use config::{CodecConfig, Effort};
pub use mode::{BlockMode, Encoded};
pub use oxitiny_core::{Result, TinyError};
pub use string::{StringEncoding, StringVariant};
pub use superblock::{MAX_SUPERBLOCK_LEN, RegionMode, SuperblockHeader};
pub use symbols::SymbolTable;
pub use text::TextProfile;

pub use stream::{compress, decompress};

#[cfg(feature = "parallel")]
pub use stream::compress_parallel;

/// Encode 1 to 512 bytes as one superblock.
///
/// # Parameters
///
/// - `input`: Bytes to encode, `1..=512` of them
/// - `config`: Effort and thresholds
///
/// # Returns
///
/// The encoded superblock. Its length is the compressed byte count.
///
/// # Errors
///
/// [`TinyError::InvalidLength`] when `input` is empty or longer than 512 bytes.
pub fn encode_block(input: &[u8], config: &CodecConfig) -> Result<Vec<u8>> {
    superblock::encode(input, config)
}

/// Decode a superblock that is expected to hold `n` bytes.
///
/// # Returns
///
/// The decoded bytes and the number of input bytes consumed.
///
/// # Errors
///
/// - [`TinyError::InvalidLength`] when `n` is outside `1..=512`
/// - [`TinyError::StructuralDecode`] when the header is invalid or its
///   length disagrees with `n`
/// - [`TinyError::UnexpectedEof`] when `input` is truncated
pub fn decode_block(input: &[u8], n: usize) -> Result<(Vec<u8>, usize)> {
    if n == 0 || n > MAX_SUPERBLOCK_LEN {
        return Err(TinyError::invalid_length(n, MAX_SUPERBLOCK_LEN));
    }

    let (header, _) = SuperblockHeader::parse(input)?;
    if header.len != n {
        return Err(TinyError::corrupted(
            0,
            format!("length mismatch: header says {}, caller expects {n}", header.len),
        ));
    }
    superblock::decode(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch() {
        let encoded = encode_block(b"some bytes to encode", &CodecConfig::default()).unwrap();
        assert!(matches!(
            decode_block(&encoded, 19),
            Err(TinyError::StructuralDecode { .. })
        ));
        assert!(decode_block(&encoded, 20).is_ok());
    }

    #[test]
    fn test_invalid_lengths() {
        assert!(matches!(
            encode_block(&[], &CodecConfig::default()),
            Err(TinyError::InvalidLength { .. })
        ));
        assert!(matches!(
            decode_block(&[0u8; 4], 0),
            Err(TinyError::InvalidLength { .. })
        ));
        assert!(matches!(
            decode_block(&[0u8; 4], 513),
            Err(TinyError::InvalidLength { .. })
        ));
    }
}
