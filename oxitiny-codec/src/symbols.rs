//! First-occurrence symbol table.
//!
//! A `SymbolTable` records the distinct byte values of a block in the order
//! they first appear, giving each a dense rank in `0..len()`. Scanning is
//! resumable: a heuristic can look at a prefix, decide to keep going, and
//! continue filling the same table.

use crate::tables::FREQUENT_TEXT;

const UNSEEN: u16 = u16::MAX;

/// Distinct values of one block, ranked by first occurrence.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// Rank of each byte value, or `UNSEEN`.
    ranks: [u16; 256],
    /// Unique values in rank order; only the first `len` entries are valid.
    uniques: [u8; 256],
    len: usize,
    /// Occurrences of each byte value so far.
    counts: [u16; 256],
    /// Number of input positions consumed by `scan*`.
    scanned: usize,
    /// Occurrences of bytes from the frequent-text set.
    text_count: usize,
    /// Bitwise OR of every observed byte.
    or_bits: u8,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            ranks: [UNSEEN; 256],
            uniques: [0; 256],
            len: 0,
            counts: [0; 256],
            scanned: 0,
            text_count: 0,
            or_bits: 0,
        }
    }

    /// Build a table over the whole of `input`.
    pub fn from_bytes(input: &[u8]) -> Self {
        let mut table = Self::new();
        table.scan(input, input.len());
        table
    }

    /// Record one byte and return its rank plus whether it was new.
    ///
    /// This does not move the scan position; it is meant for coders that
    /// walk the input themselves.
    #[inline]
    pub fn observe(&mut self, byte: u8) -> (usize, bool) {
        let slot = byte as usize;
        self.counts[slot] = self.counts[slot].saturating_add(1);
        self.text_count += FREQUENT_TEXT[slot] as usize;
        self.or_bits |= byte;

        if self.ranks[slot] == UNSEEN {
            let rank = self.len;
            self.ranks[slot] = rank as u16;
            self.uniques[rank] = byte;
            self.len += 1;
            (rank, true)
        } else {
            (self.ranks[slot] as usize, false)
        }
    }

    /// Continue scanning `input` up to position `limit` (exclusive).
    pub fn scan(&mut self, input: &[u8], limit: usize) {
        let limit = limit.min(input.len());
        while self.scanned < limit {
            self.observe(input[self.scanned]);
            self.scanned += 1;
        }
    }

    /// Continue scanning until some value has occurred `threshold` times.
    ///
    /// Returns that value and leaves the scan position just past the
    /// occurrence that reached the threshold. Returns `None` once the whole
    /// input has been scanned without any value getting there.
    pub fn scan_until_repeat(&mut self, input: &[u8], threshold: usize) -> Option<u8> {
        let reached = self
            .uniques()
            .iter()
            .find(|&&v| self.counts[v as usize] as usize >= threshold);
        if let Some(&value) = reached {
            return Some(value);
        }

        while self.scanned < input.len() {
            let byte = input[self.scanned];
            self.observe(byte);
            self.scanned += 1;
            if self.counts[byte as usize] as usize >= threshold {
                return Some(byte);
            }
        }
        None
    }

    /// Rank of `byte`, if it has been seen.
    #[inline]
    pub fn rank(&self, byte: u8) -> Option<usize> {
        match self.ranks[byte as usize] {
            UNSEEN => None,
            rank => Some(rank as usize),
        }
    }

    /// Unique values in rank order.
    #[inline]
    pub fn uniques(&self) -> &[u8] {
        &self.uniques[..self.len]
    }

    /// Number of distinct values seen.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether no value has been seen.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Occurrences of `byte` so far.
    pub fn count(&self, byte: u8) -> usize {
        self.counts[byte as usize] as usize
    }

    /// Number of input positions consumed by the scan methods.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Number of observed bytes belonging to the frequent-text set.
    pub fn text_count(&self) -> usize {
        self.text_count
    }

    /// Whether any observed byte had its high bit set.
    pub fn high_bit_seen(&self) -> bool {
        self.or_bits & 0x80 != 0
    }
}

/// Whether every byte of `input` has its high bit clear.
#[inline]
pub fn high_bit_clear(input: &[u8]) -> bool {
    input.iter().fold(0u8, |acc, &b| acc | b) & 0x80 == 0
}
