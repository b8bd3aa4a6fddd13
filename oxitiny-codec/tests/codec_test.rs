//! End-to-end tests for the superblock entry points.

use oxitiny_codec::{
    BlockMode, CodecConfig, MAX_SUPERBLOCK_LEN, RegionMode, StringVariant, SuperblockHeader,
    TinyError, block, decode_block, encode_block, string,
};

fn generate_random(size: usize, mut seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

fn generate_repetitive(size: usize) -> Vec<u8> {
    b"TOBEORNOTTOBEORTOBEORNOT"
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn generate_alternating(size: usize) -> Vec<u8> {
    (0..size).map(|i| if i % 2 == 0 { 0x55 } else { 0xAA }).collect()
}

fn generate_text(size: usize) -> Vec<u8> {
    let text = b"The quick brown fox jumps over the lazy dog. \
                 Pack my box with five dozen liquor jugs. \
                 How vexingly quick daft zebras jump! ";
    text.iter().copied().cycle().take(size).collect()
}

fn roundtrip(input: &[u8], config: &CodecConfig) -> Vec<u8> {
    let encoded = encode_block(input, config).unwrap();
    let (decoded, consumed) = decode_block(&encoded, input.len()).unwrap();
    assert_eq!(decoded, input, "n = {}", input.len());
    assert_eq!(consumed, encoded.len(), "n = {}", input.len());
    encoded
}

fn header_len(encoded: &[u8]) -> usize {
    SuperblockHeader::parse(encoded).unwrap().1
}

#[test]
fn test_roundtrip_every_length() {
    for config in [CodecConfig::FAST, CodecConfig::THOROUGH] {
        for n in 1..=MAX_SUPERBLOCK_LEN {
            let inputs = [
                vec![0x00; n],
                vec![0xFF; n],
                generate_random(n, 0x123456789ABCDEF0 ^ n as u64),
                generate_repetitive(n),
                generate_alternating(n),
                generate_text(n),
            ];
            for input in &inputs {
                let encoded = roundtrip(input, &config);
                assert!(encoded.len() <= n + header_len(&encoded));
            }
        }
    }
}

#[test]
fn test_header_size_monotonicity() {
    for n in 1..=MAX_SUPERBLOCK_LEN {
        let encoded = roundtrip(&generate_random(n, 7), &CodecConfig::default());
        let size = header_len(&encoded);
        match n {
            1..=64 => assert_eq!(size, 1, "n = {n}"),
            65..=256 => assert_eq!(size, 2, "n = {n}"),
            _ => assert!(size == 2 || size == 3, "n = {n}"),
        }
    }
}

#[test]
fn test_incompressible_input() {
    for n in [64, 128, 256, 320, 384, 512] {
        let input = generate_random(n, 0xDEADBEEF);
        let encoded = roundtrip(&input, &CodecConfig::default());
        assert_eq!(encoded.len(), n + header_len(&encoded), "n = {n}");
        // Raw units are stored verbatim after the header
        assert_eq!(&encoded[header_len(&encoded)..], &input[..]);
    }
}

#[test]
fn test_literal_example() {
    let input = [0x41u8; 64];
    let encoded = roundtrip(&input, &CodecConfig::default());

    // One info byte, then the two-byte block
    assert_eq!(encoded.len(), 3);
    let payload = &encoded[1..];
    assert_eq!(block::mode_of(payload, 64).unwrap(), BlockMode::FixedWidth);
    let (decoded, consumed) = block::decode(payload, 64).unwrap();
    assert_eq!(decoded, input);
    assert_eq!(consumed, 2);
}

#[test]
fn test_fixed_width_boundary() {
    let sixteen: Vec<u8> = (0..64).map(|i| (i * 11 % 16) as u8 + 0x30).collect();
    let encoded = roundtrip(&sixteen, &CodecConfig::default());
    assert_eq!(
        block::mode_of(&encoded[1..], 64).unwrap(),
        BlockMode::FixedWidth
    );
    // 4 + 16 * 8 + 63 * 4 bits of payload plus the tag
    assert_eq!(encoded.len(), 1 + (3 + 4 + 128 + 252usize).div_ceil(8));

    let seventeen: Vec<u8> = (0..64).map(|i| (i * 11 % 17) as u8 + 0x30).collect();
    let encoded = roundtrip(&seventeen, &CodecConfig::default());
    let header = SuperblockHeader::parse(&encoded).unwrap().0;
    if header.passed(0) {
        assert_ne!(
            block::mode_of(&encoded[1..], 64).unwrap(),
            BlockMode::FixedWidth
        );
    }
}

#[test]
fn test_single_value_dominance() {
    let noise = generate_random(16, 99);
    let input: Vec<u8> = (0..64)
        .map(|i| if i % 4 == 2 { noise[i / 4] | 0x80 } else { b' ' })
        .collect();
    let encoded = roundtrip(&input, &CodecConfig::default());
    assert!(encoded.len() < input.len());
    assert_eq!(
        block::mode_of(&encoded[1..], 64).unwrap(),
        BlockMode::SingleValue
    );
}

#[test]
fn test_extended_string_cap() {
    // 129 distinct values in first-occurrence order, then repeats of the first 32
    let mut input: Vec<u8> = (0..=128u8).map(|v| v.wrapping_mul(3)).collect();
    while input.len() < 512 {
        let i = input.len();
        input.push(input[i % 32]);
    }

    let encoding = string::encode(&input, StringVariant::extended(512), 512 * 8).unwrap();
    assert_eq!(encoding.consumed, 128);
    assert!(encoding.is_partial(512));

    for config in [CodecConfig::FAST, CodecConfig::THOROUGH] {
        roundtrip(&input, &config);
    }
}

#[test]
fn test_string_region_is_used() {
    // 60 distinct values repeating in long runs favour one string region
    let pattern: Vec<u8> = (0..60u8).map(|v| v.wrapping_mul(37) | 0x80).collect();
    let input: Vec<u8> = pattern.iter().copied().cycle().take(400).collect();
    let encoded = roundtrip(&input, &CodecConfig::THOROUGH);
    assert!(encoded.len() < input.len() / 2);
}

#[test]
fn test_text_region_is_used() {
    let input = generate_text(300);
    let encoded = roundtrip(&input, &CodecConfig::default());
    let header = SuperblockHeader::parse(&encoded).unwrap().0;
    assert_eq!(header.region, RegionMode::Text);
}

#[test]
fn test_thorough_never_larger_than_fast() {
    for n in [65, 128, 200, 256, 300, 512] {
        for input in [
            generate_text(n),
            generate_repetitive(n),
            generate_random(n, 3),
            generate_alternating(n),
        ] {
            let fast = roundtrip(&input, &CodecConfig::FAST);
            let thorough = roundtrip(&input, &CodecConfig::THOROUGH);
            assert!(thorough.len() <= fast.len(), "n = {n}");
        }
    }
}

#[test]
fn test_corrupt_input_is_rejected() {
    // Region mode 3 does not exist
    assert!(matches!(
        decode_block(&[0x01, 0x0C, 0x00, 0x00], 65),
        Err(TinyError::StructuralDecode { .. })
    ));

    // Header of a 600-byte superblock (class 1, excess 279)
    let excess: usize = 279;
    let data = [0x03 | ((excess as u8 & 0x3F) << 2), (excess >> 6) as u8];
    assert!(oxitiny_codec::superblock::decode(&data).is_err());

    // Truncated payload
    let encoded = encode_block(&generate_text(200), &CodecConfig::default()).unwrap();
    assert!(matches!(
        decode_block(&encoded[..encoded.len() - 1], 200),
        Err(TinyError::UnexpectedEof { .. })
    ));

    assert!(decode_block(&[], 10).is_err());
}
