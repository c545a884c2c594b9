// Difference block model.
//
// A block is one contiguous region where two sequences disagree, expressed
// as paired half-open index ranges (source side, target side). Either side
// may be empty: a pure insert has an empty source range, a pure delete an
// empty target range. Sorted block lists are the unit of exchange between
// the edit-script primitive, the normalizer, and the delta generator.

use std::fmt;
use std::ops::Range;

// ---------------------------------------------------------------------------
// DiffBlock
// ---------------------------------------------------------------------------

/// One contiguous region of disagreement between two sequences.
///
/// Ranges are half-open (`start..end`); a side is empty iff `start == end`.
/// A well-formed block is non-empty on at least one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffBlock {
    pub source_start: usize,
    pub source_end: usize,
    pub target_start: usize,
    pub target_end: usize,
}

/// Classification of a block by which sides carry content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Both sides non-empty: source content replaced by target content.
    Replace,
    /// Source side empty: target content inserted.
    Insert,
    /// Target side empty: source content deleted.
    Delete,
}

impl DiffBlock {
    /// Build a block from two half-open ranges.
    pub fn new(source: Range<usize>, target: Range<usize>) -> Self {
        debug_assert!(source.start <= source.end);
        debug_assert!(target.start <= target.end);
        Self {
            source_start: source.start,
            source_end: source.end,
            target_start: target.start,
            target_end: target.end,
        }
    }

    #[inline]
    pub fn source_len(&self) -> usize {
        self.source_end - self.source_start
    }

    #[inline]
    pub fn target_len(&self) -> usize {
        self.target_end - self.target_start
    }

    #[inline]
    pub fn source_is_empty(&self) -> bool {
        self.source_start == self.source_end
    }

    #[inline]
    pub fn target_is_empty(&self) -> bool {
        self.target_start == self.target_end
    }

    /// A block with no content on either side represents no edit at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source_is_empty() && self.target_is_empty()
    }

    /// Classify by which sides carry content.
    ///
    /// Empty blocks classify as `Replace`; callers that care filter them
    /// out with [`DiffBlock::is_empty`] first.
    pub fn kind(&self) -> BlockKind {
        match (self.source_is_empty(), self.target_is_empty()) {
            (true, false) => BlockKind::Insert,
            (false, true) => BlockKind::Delete,
            _ => BlockKind::Replace,
        }
    }
}

impl fmt::Display for DiffBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}) -> [{}..{})",
            self.source_start, self.source_end, self.target_start, self.target_end
        )
    }
}

// ---------------------------------------------------------------------------
// List well-formedness
// ---------------------------------------------------------------------------

/// Assert that a block list is sorted, non-overlapping, and within bounds.
///
/// # Panics
///
/// Panics if any block exceeds the sequence lengths, if consecutive blocks
/// overlap or are out of order in either dimension, or if a block's ranges
/// are inverted. A violation indicates a defect in the upstream edit-script
/// primitive and must not be repaired silently.
pub fn assert_well_formed(blocks: &[DiffBlock], source_len: usize, target_len: usize) {
    let mut prev_source_end = 0usize;
    let mut prev_target_end = 0usize;

    for (i, b) in blocks.iter().enumerate() {
        assert!(
            b.source_start <= b.source_end && b.target_start <= b.target_end,
            "block {i} has inverted ranges: {b}"
        );
        assert!(
            b.source_end <= source_len && b.target_end <= target_len,
            "block {i} out of bounds: {b} (source len {source_len}, target len {target_len})"
        );
        assert!(
            b.source_start >= prev_source_end && b.target_start >= prev_target_end,
            "block {i} overlaps or precedes its predecessor: {b}"
        );
        prev_source_end = b.source_end;
        prev_target_end = b.target_end;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classification() {
        assert_eq!(DiffBlock::new(0..2, 0..3).kind(), BlockKind::Replace);
        assert_eq!(DiffBlock::new(2..2, 0..3).kind(), BlockKind::Insert);
        assert_eq!(DiffBlock::new(0..2, 3..3).kind(), BlockKind::Delete);
    }

    #[test]
    fn lengths_and_emptiness() {
        let b = DiffBlock::new(1..4, 2..2);
        assert_eq!(b.source_len(), 3);
        assert_eq!(b.target_len(), 0);
        assert!(b.target_is_empty());
        assert!(!b.source_is_empty());
        assert!(!b.is_empty());
        assert!(DiffBlock::new(5..5, 7..7).is_empty());
    }

    #[test]
    fn well_formed_accepts_sorted_list() {
        let blocks = [
            DiffBlock::new(0..2, 0..1),
            DiffBlock::new(4..5, 3..3),
            DiffBlock::new(7..7, 5..9),
        ];
        assert_well_formed(&blocks, 10, 12);
    }

    #[test]
    #[should_panic(expected = "overlaps or precedes")]
    fn well_formed_rejects_overlap() {
        let blocks = [DiffBlock::new(0..4, 0..4), DiffBlock::new(3..6, 5..6)];
        assert_well_formed(&blocks, 10, 10);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn well_formed_rejects_out_of_bounds() {
        let blocks = [DiffBlock::new(0..11, 0..4)];
        assert_well_formed(&blocks, 10, 10);
    }
}
