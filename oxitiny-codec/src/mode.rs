//! Block modes and the result of a block encode attempt.

/// Width of the mode tag that starts every block of six bytes or more.
pub const TAG_BITS: u8 = 3;

/// Encoding chosen for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockMode {
    /// Case-enumerated coding for 1 to 5 bytes (no tag).
    Tiny,
    /// Ranks packed at a fixed width.
    FixedWidth,
    /// Back-references over a small alphabet.
    BoundedString,
    /// High bit dropped from every byte.
    SevenBit,
    /// One dominant value plus a presence mask.
    SingleValue,
    /// Variable-length codes from a character frequency table.
    Text,
}

impl BlockMode {
    /// Tag value written in front of the payload, if the mode has one.
    pub fn tag(self) -> Option<u32> {
        match self {
            Self::Tiny => None,
            Self::FixedWidth => Some(0),
            Self::BoundedString => Some(1),
            Self::SevenBit => Some(2),
            Self::SingleValue => Some(3),
            Self::Text => Some(4),
        }
    }

    /// Mode for a decoded tag value.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::FixedWidth),
            1 => Some(Self::BoundedString),
            2 => Some(Self::SevenBit),
            3 => Some(Self::SingleValue),
            4 => Some(Self::Text),
            _ => None,
        }
    }

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::FixedWidth => "fixed-width",
            Self::BoundedString => "string",
            Self::SevenBit => "7-bit",
            Self::SingleValue => "single-value",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for BlockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of encoding one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    /// The block shrank.
    Compressed {
        /// Mode that produced the output.
        mode: BlockMode,
        /// Exact number of meaningful bits in `data`.
        bits: usize,
        /// Encoded bytes, final byte zero-padded.
        data: Vec<u8>,
    },
    /// No mode beat the raw bytes; the caller stores the block as is.
    NotApplicable,
}

impl Encoded {
    /// Whether the block was compressed.
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Compressed { .. })
    }

    /// Mode used, if compressed.
    pub fn mode(&self) -> Option<BlockMode> {
        match self {
            Self::Compressed { mode, .. } => Some(*mode),
            Self::NotApplicable => None,
        }
    }

    /// Encoded bytes, if compressed.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Self::Compressed { data, .. } => Some(data),
            Self::NotApplicable => None,
        }
    }

    /// Consume the result and return the encoded bytes, if compressed.
    pub fn into_data(self) -> Option<Vec<u8>> {
        match self {
            Self::Compressed { data, .. } => Some(data),
            Self::NotApplicable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_roundtrip() {
        for mode in [
            BlockMode::FixedWidth,
            BlockMode::BoundedString,
            BlockMode::SevenBit,
            BlockMode::SingleValue,
            BlockMode::Text,
        ] {
            let tag = mode.tag().unwrap();
            assert!(tag < 1 << TAG_BITS);
            assert_eq!(BlockMode::from_tag(tag), Some(mode));
        }
        assert_eq!(BlockMode::Tiny.tag(), None);
        assert_eq!(BlockMode::from_tag(5), None);
        assert_eq!(BlockMode::from_tag(7), None);
    }

    #[test]
    fn test_encoded_accessors() {
        let encoded = Encoded::Compressed {
            mode: BlockMode::FixedWidth,
            bits: 15,
            data: vec![0x00, 0x41],
        };
        assert!(encoded.is_compressed());
        assert_eq!(encoded.mode(), Some(BlockMode::FixedWidth));
        assert_eq!(encoded.data(), Some(&[0x00, 0x41][..]));

        assert!(!Encoded::NotApplicable.is_compressed());
        assert_eq!(Encoded::NotApplicable.into_data(), None);
    }
}
