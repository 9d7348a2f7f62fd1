//! Layer boundary detection and the resulting index.
//!
//! A layer starts whenever a G0/G1 move carries a Z value different from
//! the last committed one. Comparison is exact `f32` equality, no epsilon:
//! two encodings that print the same but differ in the least bit count as a
//! layer change. That fragility is pinned by a test rather than papered
//! over.

use serde::Serialize;

use crate::decoder::{ArgLetter, CommandDecoder};
use crate::error::ArgError;

/// One layer boundary: its ordinal and the file offset of the first byte of
/// the line that introduced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerEntry {
    pub ordinal: u32,
    pub offset: u64,
}

/// Append-only ordered sequence of layer boundaries.
///
/// The root entry (ordinal 0, offset 0) represents the pre-print state and
/// is always present, even when no layer change is ever detected. Ordinals
/// equal positions in the sequence, so neighbor lookups are index
/// arithmetic rather than pointer chasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerIndex {
    entries: Vec<LayerEntry>,
}

impl Default for LayerIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerIndex {
    /// An index holding only the root sentinel.
    pub fn new() -> Self {
        Self {
            entries: vec![LayerEntry {
                ordinal: 0,
                offset: 0,
            }],
        }
    }

    /// Number of entries, root sentinel included. Always at least 1.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when only the root sentinel is present.
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    pub fn entries(&self) -> &[LayerEntry] {
        &self.entries
    }

    /// Look up a layer by ordinal.
    pub fn get(&self, ordinal: u32) -> Option<&LayerEntry> {
        self.entries.get(ordinal as usize)
    }

    /// The most recently appended entry (the root if none was).
    pub fn last(&self) -> &LayerEntry {
        self.entries.last().expect("root sentinel is always present")
    }

    fn push(&mut self, offset: u64) {
        let ordinal = self.entries.len() as u32;
        self.entries.push(LayerEntry { ordinal, offset });
    }
}

/// Stateful detector fed with decoded move commands during one pass.
pub struct LayerIndexer {
    index: LayerIndex,
    /// Last committed Z. `None` until the first Z is seen, so the first
    /// comparison always registers a change.
    last_z: Option<f32>,
}

impl Default for LayerIndexer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerIndexer {
    pub fn new() -> Self {
        Self {
            index: LayerIndex::new(),
            last_z: None,
        }
    }

    /// Inspect a decoded G0/G1 command. `line_offset` must be the offset of
    /// the line's first byte, captured before the line was parsed.
    pub fn observe_move(
        &mut self,
        decoder: &mut CommandDecoder,
        line_offset: u64,
    ) -> Result<(), ArgError> {
        if let Some(z) = decoder.arg_opt(ArgLetter::Z)? {
            if self.last_z != Some(z) {
                self.index.push(line_offset);
                self.last_z = Some(z);
            }
        }
        Ok(())
    }

    /// Hand out the finished index.
    pub fn into_index(self) -> LayerIndex {
        self.index
    }

    pub fn index(&self) -> &LayerIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(indexer: &mut LayerIndexer, line: &[u8], offset: u64) {
        let mut d = CommandDecoder::new();
        d.set_line(line).expect("decode");
        indexer.observe_move(&mut d, offset).expect("observe");
    }

    #[test]
    fn root_sentinel_is_always_present() {
        let index = LayerIndexer::new().into_index();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(0), Some(&LayerEntry { ordinal: 0, offset: 0 }));
        assert!(index.is_empty());
    }

    #[test]
    fn first_z_starts_a_layer() {
        let mut ix = LayerIndexer::new();
        feed(&mut ix, b"G1 X10 Y10 Z0.2 F1500", 0);
        let index = ix.into_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(1), Some(&LayerEntry { ordinal: 1, offset: 0 }));
    }

    #[test]
    fn repeated_z_is_idempotent() {
        let mut ix = LayerIndexer::new();
        feed(&mut ix, b"G1 X10 Z0.2", 0);
        feed(&mut ix, b"G1 X12 Z0.2", 12);
        assert_eq!(ix.index().len(), 2);
    }

    #[test]
    fn moves_without_z_do_not_open_layers() {
        let mut ix = LayerIndexer::new();
        feed(&mut ix, b"G1 X10 Y10 Z0.2", 0);
        feed(&mut ix, b"G1 X12 Y10", 16);
        feed(&mut ix, b"G1 X12 Y12 Z0.4", 27);
        let index = ix.into_index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(1).unwrap().offset, 0);
        assert_eq!(index.get(2).unwrap().offset, 27);
    }

    #[test]
    fn ordinals_and_offsets_strictly_increase() {
        let mut ix = LayerIndexer::new();
        for (i, z) in [b"G1 Z0.2", b"G1 Z0.4", b"G1 Z0.6"].iter().enumerate() {
            feed(&mut ix, *z, (i as u64 + 1) * 100);
        }
        let index = ix.into_index();
        for pair in index.entries().windows(2) {
            assert_eq!(pair[1].ordinal, pair[0].ordinal + 1);
            assert!(pair[1].offset > pair[0].offset);
        }
    }

    #[test]
    fn z_comparison_is_exact_not_tolerant() {
        // Z1.0000001 scans to the f32 one ulp above 1.0, so a nominally
        // identical height opens a second layer. Pinned, not endorsed.
        let mut ix = LayerIndexer::new();
        feed(&mut ix, b"G1 Z1", 0);
        feed(&mut ix, b"G1 Z1.0000001", 50);
        assert_eq!(ix.index().len(), 3);
    }

    #[test]
    fn z_values_beyond_f32_precision_collapse() {
        // the flip side of exact comparison: textually distinct heights
        // that round to the same f32 never open a second layer
        let mut ix = LayerIndexer::new();
        feed(&mut ix, b"G1 Z16777216", 0);
        feed(&mut ix, b"G1 Z16777217", 80);
        assert_eq!(ix.index().len(), 2);
    }
}
