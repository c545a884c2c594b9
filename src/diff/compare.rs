// Sequence comparers.
//
// The diff stack (edit-script primitive + block normalizer) never touches
// sequence elements directly; everything goes through the SequenceComparer
// trait. Cross-sequence equality drives the edit-script search, and
// same-sequence equality drives boundary shifting in the normalizer (a
// boundary can slide through a run of repeated elements).
//
// Two implementations: BytesComparer for raw byte runs (the windowed
// generator's element type) and LineComparer for line-oriented text with
// optional whitespace/EOL normalization.

use bitflags::bitflags;
use std::ops::Range;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Equality oracle over two indexed sequences.
///
/// Implementations must be pure: no side effects, and any index within
/// `[0, len)` of the respective sequence is safe to pass.
pub trait SequenceComparer {
    /// Element count of the left (source) sequence.
    fn left_len(&self) -> usize;

    /// Element count of the right (target) sequence.
    fn right_len(&self) -> usize;

    /// Does `left[i]` equal `right[j]`?
    fn equal(&self, i: usize, j: usize) -> bool;

    /// Does `left[i]` equal `left[j]`?
    fn equal_left(&self, i: usize, j: usize) -> bool;

    /// Does `right[i]` equal `right[j]`?
    fn equal_right(&self, i: usize, j: usize) -> bool;
}

// ---------------------------------------------------------------------------
// Byte comparer
// ---------------------------------------------------------------------------

/// Compares two byte slices element-wise. Used by the windowed delta
/// generator, which diffs source/target chunks as byte sequences.
pub struct BytesComparer<'a> {
    left: &'a [u8],
    right: &'a [u8],
}

impl<'a> BytesComparer<'a> {
    pub fn new(left: &'a [u8], right: &'a [u8]) -> Self {
        Self { left, right }
    }
}

impl SequenceComparer for BytesComparer<'_> {
    #[inline]
    fn left_len(&self) -> usize {
        self.left.len()
    }

    #[inline]
    fn right_len(&self) -> usize {
        self.right.len()
    }

    #[inline]
    fn equal(&self, i: usize, j: usize) -> bool {
        self.left[i] == self.right[j]
    }

    #[inline]
    fn equal_left(&self, i: usize, j: usize) -> bool {
        self.left[i] == self.left[j]
    }

    #[inline]
    fn equal_right(&self, i: usize, j: usize) -> bool {
        self.right[i] == self.right[j]
    }
}

// ---------------------------------------------------------------------------
// Comparison flags
// ---------------------------------------------------------------------------

bitflags! {
    /// Options changing the element-equality predicate of [`LineComparer`]
    /// without changing the diff algorithm.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CompareFlags: u8 {
        /// Ignore trailing spaces and tabs at the end of a line.
        const IGNORE_TRAILING_SPACE = 1 << 0;
        /// Treat `\n`, `\r\n`, and `\r` line endings as equal.
        const IGNORE_EOL_STYLE = 1 << 1;
    }
}

// ---------------------------------------------------------------------------
// Line comparer
// ---------------------------------------------------------------------------

/// Compares two texts line by line.
///
/// Lines keep their terminators, so an EOL change is a difference unless
/// `IGNORE_EOL_STYLE` is set. A final line without a terminator is still a
/// line.
pub struct LineComparer<'a> {
    left: &'a [u8],
    right: &'a [u8],
    left_lines: Vec<Range<usize>>,
    right_lines: Vec<Range<usize>>,
    flags: CompareFlags,
}

impl<'a> LineComparer<'a> {
    pub fn new(left: &'a [u8], right: &'a [u8], flags: CompareFlags) -> Self {
        Self {
            left,
            right,
            left_lines: split_lines(left),
            right_lines: split_lines(right),
            flags,
        }
    }

    /// Byte range of line `i` of the left text (terminator included).
    pub fn left_line(&self, i: usize) -> Range<usize> {
        self.left_lines[i].clone()
    }

    /// Byte range of line `i` of the right text (terminator included).
    pub fn right_line(&self, i: usize) -> Range<usize> {
        self.right_lines[i].clone()
    }

    fn lines_equal(&self, a: &[u8], b: &[u8]) -> bool {
        if self.flags.is_empty() {
            return a == b;
        }
        let (a_content, a_eol) = split_eol(a);
        let (b_content, b_eol) = split_eol(b);

        let (a_content, b_content) = if self.flags.contains(CompareFlags::IGNORE_TRAILING_SPACE) {
            (trim_trailing_blank(a_content), trim_trailing_blank(b_content))
        } else {
            (a_content, b_content)
        };
        if a_content != b_content {
            return false;
        }

        if self.flags.contains(CompareFlags::IGNORE_EOL_STYLE) {
            // Only presence matters: a terminated line never equals an
            // unterminated one.
            a_eol.is_empty() == b_eol.is_empty()
        } else {
            a_eol == b_eol
        }
    }
}

impl SequenceComparer for LineComparer<'_> {
    fn left_len(&self) -> usize {
        self.left_lines.len()
    }

    fn right_len(&self) -> usize {
        self.right_lines.len()
    }

    fn equal(&self, i: usize, j: usize) -> bool {
        self.lines_equal(
            &self.left[self.left_lines[i].clone()],
            &self.right[self.right_lines[j].clone()],
        )
    }

    fn equal_left(&self, i: usize, j: usize) -> bool {
        self.lines_equal(
            &self.left[self.left_lines[i].clone()],
            &self.left[self.left_lines[j].clone()],
        )
    }

    fn equal_right(&self, i: usize, j: usize) -> bool {
        self.lines_equal(
            &self.right[self.right_lines[i].clone()],
            &self.right[self.right_lines[j].clone()],
        )
    }
}

// ---------------------------------------------------------------------------
// Line tokenization helpers
// ---------------------------------------------------------------------------

/// Split text into line ranges, terminators included.
/// Recognizes `\n`, `\r\n`, and bare `\r`.
fn split_lines(text: &[u8]) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < text.len() {
        match text[i] {
            b'\n' => {
                lines.push(start..i + 1);
                i += 1;
                start = i;
            }
            b'\r' => {
                let end = if text.get(i + 1) == Some(&b'\n') { i + 2 } else { i + 1 };
                lines.push(start..end);
                i = end;
                start = end;
            }
            _ => i += 1,
        }
    }
    if start < text.len() {
        lines.push(start..text.len());
    }
    lines
}

/// Split a line into (content, terminator).
fn split_eol(line: &[u8]) -> (&[u8], &[u8]) {
    if line.ends_with(b"\r\n") {
        line.split_at(line.len() - 2)
    } else if line.ends_with(b"\n") || line.ends_with(b"\r") {
        line.split_at(line.len() - 1)
    } else {
        (line, &[])
    }
}

fn trim_trailing_blank(content: &[u8]) -> &[u8] {
    let mut end = content.len();
    while end > 0 && (content[end - 1] == b' ' || content[end - 1] == b'\t') {
        end -= 1;
    }
    &content[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
