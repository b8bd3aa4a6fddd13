//! # OxiTiny Core
//!
//! Core components for the OxiTiny tiny-block codec.
//!
//! This crate provides the building blocks shared by every coder:
//!
//! - [`bitstream`]: LSB-first bit-level I/O over in-memory buffers
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Driver                                              │
//! │     oxitiny CLI, chunked stream helpers                 │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Orchestration                                       │
//! │     Superblock (≤512 bytes), Block (≤64 bytes)          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Coders                                              │
//! │     Tiny, fixed-width, single-value, 7-bit, text, string│
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: BitStream (this crate)                              │
//! │     BitReader/BitWriter, TinyError                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxitiny_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0x1AB, 9);
//! let data = writer.into_vec();
//!
//! let mut reader = BitReader::new(&data);
//! assert_eq!(reader.read_bits(9).unwrap(), 0x1AB);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter, bits_for};
pub use error::{Result, TinyError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter, bits_for};
    pub use crate::error::{Result, TinyError};
}
