// Block normalizer.
//
// An edit-script primitive can place equal-cost block boundaries at several
// valid positions when the surrounding content repeats (runs of identical
// bytes, repeated blank lines). Normalization rewrites a sorted raw block
// list into one canonical form so that equivalent inputs always produce the
// same delta:
//
//   1. join      — merge consecutive blocks whose gap is within the gutter
//                  in both dimensions
//   2. shift-up  — slide each block as far toward its predecessor as the
//                  repeated content allows; merge on contact
//   3. shift-down — slide the remainder toward the successor (or the
//                  sequence ends); merge on contact
//
// Pass order makes the predecessor side win when a block could attach to
// either neighbor.

use log::trace;

use super::block::{DiffBlock, assert_well_formed};
use super::compare::SequenceComparer;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Normalize a sorted block list in place.
///
/// `gutter` is the largest inter-block gap (in elements, per dimension)
/// that the join pass may absorb; 0 merges only directly adjacent blocks.
///
/// # Panics
///
/// Panics if the input list is not sorted and non-overlapping within the
/// comparer's bounds. That indicates a defect in the upstream edit-script
/// primitive; it is never repaired silently.
pub fn normalize(cmp: &dyn SequenceComparer, gutter: usize, blocks: &mut Vec<DiffBlock>) {
    assert_well_formed(blocks, cmp.left_len(), cmp.right_len());

    let raw_len = blocks.len();

    // Run the three passes to fixpoint: a shift can bring two blocks within
    // the gutter only after the join pass already ran, and a merge can open
    // new room to shift. Each round either merges (the list shrinks) or
    // reproduces the previous round's output, so this terminates.
    loop {
        let before = blocks.clone();
        join(gutter, blocks);
        shift_up(cmp, blocks);
        shift_down(cmp, blocks);
        if *blocks == before {
            break;
        }
    }

    trace!(
        "normalized {} raw blocks into {} canonical blocks",
        raw_len,
        blocks.len()
    );
}

// ---------------------------------------------------------------------------
// Join pass
// ---------------------------------------------------------------------------

fn join(gutter: usize, blocks: &mut Vec<DiffBlock>) {
    let mut i = 1;
    while i < blocks.len() {
        let gap_source = blocks[i].source_start - blocks[i - 1].source_end;
        let gap_target = blocks[i].target_start - blocks[i - 1].target_end;
        if gap_source <= gutter && gap_target <= gutter {
            blocks[i - 1].source_end = blocks[i].source_end;
            blocks[i - 1].target_end = blocks[i].target_end;
            blocks.remove(i);
        } else {
            i += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Shift passes
// ---------------------------------------------------------------------------

/// Can the block slide one position earlier without changing the edit?
///
/// Sliding is valid when, on every side that has content, the element
/// entering the block equals the element leaving it. A block that is empty
/// on both sides never slides.
fn can_shift_up(cmp: &dyn SequenceComparer, b: &DiffBlock) -> bool {
    if b.is_empty() {
        return false;
    }
    let source_ok =
        b.source_is_empty() || cmp.equal_left(b.source_start - 1, b.source_end - 1);
    let target_ok =
        b.target_is_empty() || cmp.equal_right(b.target_start - 1, b.target_end - 1);
    source_ok && target_ok
}

/// Mirror image of [`can_shift_up`] for sliding one position later.
fn can_shift_down(cmp: &dyn SequenceComparer, b: &DiffBlock) -> bool {
    if b.is_empty() {
        return false;
    }
    let source_ok = b.source_is_empty() || cmp.equal_left(b.source_end, b.source_start);
    let target_ok = b.target_is_empty() || cmp.equal_right(b.target_end, b.target_start);
    source_ok && target_ok
}

fn shift_up(cmp: &dyn SequenceComparer, blocks: &mut Vec<DiffBlock>) {
    let mut i = 1;
    while i < blocks.len() {
        let prev = blocks[i - 1];
        let mut b = blocks[i];
        let gap_source = b.source_start - prev.source_end;
        let gap_target = b.target_start - prev.target_end;

        // Equal gaps in both dimensions are the precondition for sliding:
        // the matched run between the blocks is what the boundary moves
        // through.
        if gap_source == gap_target && gap_source > 0 {
            let mut moved = 0;
            while moved < gap_source && can_shift_up(cmp, &b) {
                b.source_start -= 1;
                b.source_end -= 1;
                b.target_start -= 1;
                b.target_end -= 1;
                moved += 1;
            }
            blocks[i] = b;

            if moved == gap_source {
                // Contact with the predecessor: merge and re-check the same
                // index against the grown block.
                blocks[i - 1].source_end = b.source_end;
                blocks[i - 1].target_end = b.target_end;
                blocks.remove(i);
                continue;
            }
        }
        i += 1;
    }
}

fn shift_down(cmp: &dyn SequenceComparer, blocks: &mut Vec<DiffBlock>) {
    let mut i = 0;
    while i < blocks.len() {
        let (next_source, next_target) = match blocks.get(i + 1) {
            Some(next) => (next.source_start, next.target_start),
            // The sequence ends act as the boundary for the last block.
            None => (cmp.left_len(), cmp.right_len()),
        };
        let mut b = blocks[i];
        let gap_source = next_source - b.source_end;
        let gap_target = next_target - b.target_end;

        if gap_source == gap_target && gap_source > 0 {
            let mut moved = 0;
            while moved < gap_source && can_shift_down(cmp, &b) {
                b.source_start += 1;
                b.source_end += 1;
                b.target_start += 1;
                b.target_end += 1;
                moved += 1;
            }
            blocks[i] = b;

            if moved == gap_source && i + 1 < blocks.len() {
                // Contact with the successor: merge and re-check the merged
                // block at the same index.
                blocks[i + 1].source_start = b.source_start;
                blocks[i + 1].target_start = b.target_start;
                blocks.remove(i);
                continue;
            }
        }
        i += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
