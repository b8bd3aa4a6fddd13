//! Chunked compression of arbitrary-length buffers.
//!
//! The input is cut into 512-byte chunks and each chunk becomes one
//! superblock. Superblocks carry their own length, so the output is a plain
//! concatenation with no framing.

use log::debug;
use oxitiny_core::Result;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::CodecConfig;
use crate::superblock::{self, MAX_SUPERBLOCK_LEN};

/// Bytes per superblock when chunking a buffer.
pub const CHUNK_LEN: usize = MAX_SUPERBLOCK_LEN;

/// Compress `data` as a sequence of superblocks.
///
/// Empty input gives empty output.
pub fn compress(data: &[u8], config: &CodecConfig) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() + data.len() / CHUNK_LEN + 3);
    for chunk in data.chunks(CHUNK_LEN) {
        output.extend_from_slice(&superblock::encode(chunk, config)?);
    }
    debug!(
        "compressed {} bytes into {} bytes ({} superblocks)",
        data.len(),
        output.len(),
        data.len().div_ceil(CHUNK_LEN)
    );
    Ok(output)
}

/// Compress `data` with chunks encoded on the rayon thread pool.
///
/// The output is byte-identical to [`compress`].
#[cfg(feature = "parallel")]
pub fn compress_parallel(data: &[u8], config: &CodecConfig) -> Result<Vec<u8>> {
    let chunks: Vec<&[u8]> = data.chunks(CHUNK_LEN).collect();

    let encoded: Vec<Result<Vec<u8>>> = chunks
        .par_iter()
        .map(|chunk| superblock::encode(chunk, config))
        .collect();

    let mut output = Vec::with_capacity(data.len() + chunks.len() * 3);
    for block in encoded {
        output.extend_from_slice(&block?);
    }
    Ok(output)
}

/// Decompress a sequence of superblocks.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() * 2);
    let mut pos = 0;
    while pos < data.len() {
        let (block, consumed) = superblock::decode(&data[pos..]).inspect_err(|e| {
            debug!("superblock at byte {pos} failed to decode: {e}");
        })?;
        output.extend_from_slice(&block);
        pos += consumed;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(compress(&[], &CodecConfig::default()).unwrap().is_empty());
        assert!(decompress(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_multi_chunk() {
        let data: Vec<u8> = b"chunked input, several superblocks long. "
            .iter()
            .copied()
            .cycle()
            .take(CHUNK_LEN * 3 + 77)
            .collect();
        let compressed = compress(&data, &CodecConfig::default()).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        let mut compressed = compress(&[0u8; 600], &CodecConfig::default()).unwrap();
        compressed.push(0x81);
        assert!(decompress(&compressed).is_err());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i * 7 % 251) as u8).collect();
        let config = CodecConfig::default();
        assert_eq!(
            compress_parallel(&data, &config).unwrap(),
            compress(&data, &config).unwrap()
        );
    }
}
