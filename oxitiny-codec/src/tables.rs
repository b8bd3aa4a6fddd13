//! Constant lookup tables shared by the coders.
//!
//! Every table here is immutable data. Reverse indexes are derived from
//! the character lists at compile time.

/// Marker for "byte not present" in a reverse index.
pub const NOT_PRESENT: u8 = 0xFF;

/// The 16 characters the tiny coder can express as a 4-bit index.
pub const TINY_TEXT_CHARS: [u8; 16] = *b" etainoshrdlucmf";

/// Reverse index for [`TINY_TEXT_CHARS`].
pub const TINY_TEXT_INDEX: [u8; 256] = reverse_index(&TINY_TEXT_CHARS);

/// Number of entries in each variable-length text table.
pub const TEXT_TABLE_LEN: usize = 23;

/// Frequency-ordered table for plain natural-language text.
pub const STANDARD_TEXT_CHARS: [u8; TEXT_TABLE_LEN] = [
    b' ', b'e', b't', b'a', b'i', b'n', b'o', b's', b'h', b'r', b'd', b'l', b'u', b'c', b'\n', b'm',
    b'g', b'f', b',', b'y', b'w', b'p', b'b',
];

/// Frequency-ordered table for markup (XML, HTML).
pub const MARKUP_TEXT_CHARS: [u8; TEXT_TABLE_LEN] = [
    b' ', b'/', b'<', b'>', b'e', b't', b'a', b'i', b'n', b'o', b's', b'h', b'r', b'd', b'l', b'\n',
    b'.', b'u', b'w', b'c', b'\'', b'"', b':',
];

/// Frequency-ordered table for source code.
pub const CODE_TEXT_CHARS: [u8; TEXT_TABLE_LEN] = [
    b' ', b'e', b't', b'a', b'i', b'n', b'o', b's', b'h', b'r', b'd', b'l', b'*', b'=', b'\t', b'\n',
    b'c', b';', b'f', b'(', b')', b'\'', b'/',
];

/// Reverse index for [`STANDARD_TEXT_CHARS`].
pub const STANDARD_TEXT_INDEX: [u8; 256] = reverse_index(&STANDARD_TEXT_CHARS);
/// Reverse index for [`MARKUP_TEXT_CHARS`].
pub const MARKUP_TEXT_INDEX: [u8; 256] = reverse_index(&MARKUP_TEXT_CHARS);
/// Reverse index for [`CODE_TEXT_CHARS`].
pub const CODE_TEXT_INDEX: [u8; 256] = reverse_index(&CODE_TEXT_CHARS);

/// Bytes counted as "frequent text" by the block scan heuristics.
pub const FREQUENT_TEXT: [bool; 256] = membership(b"\n ,abcdefghilmnoprstuwy");

/// Bytes counted as plausible prose when judging a whole region.
pub const PROSE_CHARS: [bool; 256] = {
    let mut table = membership(b"\n\r !\",.?");
    let mut c = 0;
    while c < 26 {
        table[b'A' as usize + c] = true;
        table[b'a' as usize + c] = true;
        c += 1;
    }
    table
};

/// Signature characters of markup text.
pub const MARKUP_SIGNATURE: [bool; 256] = membership(b"<>/\":");

/// Signature characters of source code.
pub const CODE_SIGNATURE: [bool; 256] = membership(b",=;()/*");

/// Largest unique count, per block length, for which fixed-width packing
/// still saves at least a quarter of the block.
pub const UNIQUE_LIMITS: [u8; 65] = [
    0, 0, 1, 1, 2, 2, 2, 3, 3, 4, 4, 4, 4, 4, 4, 5, 5, 6, 6, 7, 7, 7, 7, // 0..=22
    8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, // 23..=39
    9, 9, 9, 9, 10, 10, 10, 10, 11, 11, 11, 11, 12, 12, 12, 12, 13, 13, 13, 13, // 40..=59
    14, 14, 15, 15, 16, // 60..=64
];

const fn reverse_index<const N: usize>(chars: &[u8; N]) -> [u8; 256] {
    let mut index = [NOT_PRESENT; 256];
    let mut i = 0;
    while i < N {
        index[chars[i] as usize] = i as u8;
        i += 1;
    }
    index
}

const fn membership(chars: &[u8]) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < chars.len() {
        table[chars[i] as usize] = true;
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_indexes() {
        for (i, &c) in STANDARD_TEXT_CHARS.iter().enumerate() {
            assert_eq!(STANDARD_TEXT_INDEX[c as usize] as usize, i);
        }
        for (i, &c) in MARKUP_TEXT_CHARS.iter().enumerate() {
            assert_eq!(MARKUP_TEXT_INDEX[c as usize] as usize, i);
        }
        for (i, &c) in CODE_TEXT_CHARS.iter().enumerate() {
            assert_eq!(CODE_TEXT_INDEX[c as usize] as usize, i);
        }
        assert_eq!(TINY_TEXT_INDEX[b'f' as usize], 15);
        assert_eq!(TINY_TEXT_INDEX[b'z' as usize], NOT_PRESENT);
    }

    #[test]
    fn test_frequent_text_size() {
        assert_eq!(FREQUENT_TEXT.iter().filter(|&&b| b).count(), 23);
        assert!(FREQUENT_TEXT[b'e' as usize]);
        assert!(!FREQUENT_TEXT[b'z' as usize]);
    }

    #[test]
    fn test_prose_chars() {
        assert!(PROSE_CHARS[b'Q' as usize]);
        assert!(PROSE_CHARS[b'\r' as usize]);
        assert!(!PROSE_CHARS[b'<' as usize]);
        assert_eq!(PROSE_CHARS.iter().filter(|&&b| b).count(), 60);
    }

    #[test]
    fn test_unique_limits_anchors() {
        assert_eq!(UNIQUE_LIMITS[2], 1);
        assert_eq!(UNIQUE_LIMITS[9], 4);
        assert_eq!(UNIQUE_LIMITS[23], 8);
        assert_eq!(UNIQUE_LIMITS[39], 8);
        assert_eq!(UNIQUE_LIMITS[40], 9);
        assert_eq!(UNIQUE_LIMITS[63], 15);
        assert_eq!(UNIQUE_LIMITS[64], 16);
        assert!(UNIQUE_LIMITS.windows(2).all(|w| w[0] <= w[1]));
    }
}
