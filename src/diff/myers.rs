// Default edit-script primitive.
//
// Implements Eugene Myers' O(ND) shortest-edit-script search over a
// SequenceComparer, producing a sorted, non-overlapping raw block list for
// the normalizer. The primitive is pluggable: the generator accepts any
// DiffAlgorithm, and this one only promises blocks satisfying the ordering
// invariant, not a particular boundary placement (that is the normalizer's
// job).
//
// The search is bounded: past `max_cost` edit steps the result degrades to
// a single whole-range replace block. Correct, not minimal — it keeps the
// cost of diffing two unrelated window chunks linear.

use super::block::DiffBlock;
use super::compare::SequenceComparer;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A raw difference computation between the two sequences of a comparer.
///
/// Implementations must return blocks that are sorted ascending and
/// non-overlapping in both dimensions, each non-empty on at least one side.
pub trait DiffAlgorithm {
    fn diff(&self, cmp: &dyn SequenceComparer) -> Vec<DiffBlock>;
}

// ---------------------------------------------------------------------------
// Myers
// ---------------------------------------------------------------------------

/// Default bound on the number of edit steps before falling back to a
/// whole-range replace.
pub const DEFAULT_MAX_COST: usize = 1024;

/// Myers greedy shortest-edit-script search.
#[derive(Debug, Clone, Copy)]
pub struct Myers {
    /// Edit-step ceiling; beyond it the diff degrades to one replace block.
    pub max_cost: usize,
}

impl Default for Myers {
    fn default() -> Self {
        Self {
            max_cost: DEFAULT_MAX_COST,
        }
    }
}

impl DiffAlgorithm for Myers {
    fn diff(&self, cmp: &dyn SequenceComparer) -> Vec<DiffBlock> {
        let n = cmp.left_len();
        let m = cmp.right_len();

        // Trim the common prefix and suffix; the search only sees the middle.
        let mut prefix = 0usize;
        while prefix < n && prefix < m && cmp.equal(prefix, prefix) {
            prefix += 1;
        }
        let mut suffix = 0usize;
        while suffix < n - prefix
            && suffix < m - prefix
            && cmp.equal(n - 1 - suffix, m - 1 - suffix)
        {
            suffix += 1;
        }

        let mid_n = n - prefix - suffix;
        let mid_m = m - prefix - suffix;

        if mid_n == 0 && mid_m == 0 {
            return Vec::new();
        }
        if mid_n == 0 || mid_m == 0 {
            // Pure insert or pure delete.
            return vec![DiffBlock::new(
                prefix..prefix + mid_n,
                prefix..prefix + mid_m,
            )];
        }

        match shortest_edit(cmp, prefix, mid_n, mid_m, self.max_cost) {
            Some(trace) => backtrack(&trace, prefix, mid_n, mid_m),
            // Cost ceiling hit: one replace block spanning the middle.
            None => vec![DiffBlock::new(
                prefix..prefix + mid_n,
                prefix..prefix + mid_m,
            )],
        }
    }
}

// ---------------------------------------------------------------------------
// Forward search
// ---------------------------------------------------------------------------

struct Trace {
    /// One furthest-reaching snapshot per edit distance d; each row holds
    /// the x values indexed by `k + max_cost`.
    rounds: Vec<Vec<usize>>,
    max_cost: usize,
}

/// Run the greedy forward search. Returns the per-round snapshots needed
/// for backtracking, or None if `max_cost` rounds were exhausted.
fn shortest_edit(
    cmp: &dyn SequenceComparer,
    prefix: usize,
    n: usize,
    m: usize,
    max_cost: usize,
) -> Option<Trace> {
    let limit = max_cost.min(n + m);
    let width = 2 * limit + 1;
    let mut v = vec![0usize; width];
    let mut rounds = Vec::new();

    for d in 0..=limit {
        rounds.push(v.clone());
        let d_i = d as isize;
        let mut k = -d_i;
        while k <= d_i {
            let idx = (k + limit as isize) as usize;
            let mut x = if k == -d_i || (k != d_i && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && cmp.equal(prefix + x, prefix + y) {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                return Some(Trace {
                    rounds,
                    max_cost: limit,
                });
            }
            k += 2;
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Backtrack
// ---------------------------------------------------------------------------

/// Walk the trace backwards from (n, m), collecting single-element edits,
/// then coalesce adjacent edits into blocks.
fn backtrack(trace: &Trace, prefix: usize, n: usize, m: usize) -> Vec<DiffBlock> {
    let limit = trace.max_cost;

    // (x, y, is_delete) per edit step, collected in reverse order.
    let mut edits: Vec<(usize, usize, bool)> = Vec::new();
    let mut x = n as isize;
    let mut y = m as isize;

    for (d, v) in trace.rounds.iter().enumerate().rev() {
        let d_i = d as isize;
        let k = x - y;
        let idx = (k + limit as isize) as usize;
        let prev_k = if k == -d_i || (k != d_i && v[idx - 1] < v[idx + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_idx = (prev_k + limit as isize) as usize;
        let prev_x = v[prev_idx] as isize;
        let prev_y = prev_x - prev_k;

        // Diagonal run (matches) back to the edit point.
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            // The single edit step of this round.
            let is_delete = x != prev_x;
            edits.push((prev_x as usize, prev_y as usize, is_delete));
        }
        x = prev_x;
        y = prev_y;
    }
    edits.reverse();

    // Coalesce contiguous edits into blocks.
    let mut blocks: Vec<DiffBlock> = Vec::new();
    for (ex, ey, is_delete) in edits {
        let sx = prefix + ex;
        let sy = prefix + ey;
        if let Some(last) = blocks.last_mut()
            && last.source_end == sx
            && last.target_end == sy
        {
            if is_delete {
                last.source_end += 1;
            } else {
                last.target_end += 1;
            }
            continue;
        }
        blocks.push(if is_delete {
            DiffBlock::new(sx..sx + 1, sy..sy)
        } else {
            DiffBlock::new(sx..sx, sy..sy + 1)
        });
    }
    blocks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::block::assert_well_formed;
    use crate::diff::compare::BytesComparer;

    fn diff_bytes(left: &[u8], right: &[u8]) -> Vec<DiffBlock> {
        let cmp = BytesComparer::new(left, right);
        let blocks = Myers::default().diff(&cmp);
        assert_well_formed(&blocks, left.len(), right.len());
        blocks
    }

    /// Reconstruct the right sequence from the left plus blocks.
    fn apply(left: &[u8], right: &[u8], blocks: &[DiffBlock]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut spos = 0usize;
        for b in blocks {
            out.extend_from_slice(&left[spos..b.source_start]);
            out.extend_from_slice(&right[b.target_start..b.target_end]);
            spos = b.source_end;
        }
        out.extend_from_slice(&left[spos..]);
        out
    }

    #[test]
    fn identical_sequences_have_no_blocks() {
        assert!(diff_bytes(b"abcdef", b"abcdef").is_empty());
        assert!(diff_bytes(b"", b"").is_empty());
    }

    #[test]
    fn pure_insert_and_delete() {
        let blocks = diff_bytes(b"", b"hello");
        assert_eq!(blocks, vec![DiffBlock::new(0..0, 0..5)]);

        let blocks = diff_bytes(b"hello", b"");
        assert_eq!(blocks, vec![DiffBlock::new(0..5, 0..0)]);
    }

    #[test]
    fn trailing_delete() {
        let blocks = diff_bytes(b"abcabc", b"abc");
        assert_eq!(blocks, vec![DiffBlock::new(3..6, 3..3)]);
    }

    #[test]
    fn single_replace() {
        let blocks = diff_bytes(b"abcdef", b"abXdef");
        assert_eq!(blocks.len(), 1);
        assert_eq!(apply(b"abcdef", b"abXdef", &blocks), b"abXdef");
    }

    #[test]
    fn roundtrip_various() {
        let cases: &[(&[u8], &[u8])] = &[
            (b"the quick brown fox", b"the quick red fox"),
            (b"abcdefgh", b"axcxexgx"),
            (b"aaaa", b"aa"),
            (b"xyz", b"abc"),
            (b"mississippi", b"missouri"),
            (b"", b"abc"),
            (b"abc", b""),
        ];
        for (left, right) in cases {
            let blocks = diff_bytes(left, right);
            assert_eq!(
                apply(left, right, &blocks),
                *right,
                "apply mismatch for {left:?} -> {right:?}"
            );
        }
    }

    #[test]
    fn blocks_are_minimal_for_simple_edit() {
        // One char changed: exactly one replace block of length 1.
        let blocks = diff_bytes(b"abcdefghij", b"abcdeFghij");
        assert_eq!(blocks, vec![DiffBlock::new(5..6, 5..6)]);
    }

    #[test]
    fn cost_ceiling_degrades_to_replace() {
        let myers = Myers { max_cost: 2 };
        let left = b"abcdefgh";
        let right = b"12345678";
        let cmp = BytesComparer::new(left, right);
        let blocks = myers.diff(&cmp);
        assert_eq!(blocks, vec![DiffBlock::new(0..8, 0..8)]);
        assert_eq!(apply(left, right, &blocks), right);
    }

    #[test]
    fn cost_ceiling_keeps_common_affix() {
        // Prefix/suffix are trimmed before the bounded search, so they
        // stay outside the fallback block.
        let myers = Myers { max_cost: 1 };
        let left = b"PREFIXabcdefghSUFFIX";
        let right = b"PREFIX12345678SUFFIX";
        let cmp = BytesComparer::new(left, right);
        let blocks = myers.diff(&cmp);
        assert_eq!(blocks, vec![DiffBlock::new(6..14, 6..14)]);
    }
}
