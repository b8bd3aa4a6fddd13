//! Encoder configuration.
//!
//! Decoding never needs a configuration: every superblock describes itself.

/// How hard the superblock encoder works to find the smallest output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Effort {
    /// Heuristic mode selection: first acceptable candidate wins (effort 0).
    #[default]
    Fast,
    /// Try every whole-region candidate and keep the smallest (effort 1).
    Thorough,
}

impl Effort {
    /// Map a numeric effort level (0 or 1) onto an `Effort`.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Fast),
            1 => Some(Self::Thorough),
            _ => None,
        }
    }

    /// Numeric effort level.
    pub fn level(self) -> u8 {
        match self {
            Self::Fast => 0,
            Self::Thorough => 1,
        }
    }
}

/// Encoder parameters.
///
/// The numeric fields are tuning thresholds. Any value keeps the output
/// decodable; they only move the point where a mode is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Candidate search effort.
    pub effort: Effort,
    /// Shortest block for which 7-bit packing is attempted.
    pub min_seven_bit_len: usize,
    /// Shortest block for which bounded string coding is attempted.
    pub min_string_block_len: usize,
    /// Shortest superblock for which whole-region text or string coding is attempted.
    pub min_region_len: usize,
}

impl CodecConfig {
    /// Heuristic selection with the stock thresholds.
    pub const FAST: Self = Self {
        effort: Effort::Fast,
        min_seven_bit_len: 16,
        min_string_block_len: 32,
        min_region_len: 128,
    };

    /// Exhaustive whole-region selection with the stock thresholds.
    pub const THOROUGH: Self = Self {
        effort: Effort::Thorough,
        ..Self::FAST
    };

    /// Create a configuration with the stock thresholds and the given effort.
    pub fn with_effort(effort: Effort) -> Self {
        Self {
            effort,
            ..Self::FAST
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::FAST
    }
}
