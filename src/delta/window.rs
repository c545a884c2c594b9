// Delta consumer protocol.
//
// The generator's sole interaction point with the outside world. A sink
// receives, per generator step and in strict synchronous order:
//
//   window_begin(absolute source offset)
//   instruction(...)        zero or more
//   window_end()
//
// and a single stream_end() after the final window. What the sink does
// with the data — persist it, apply it, frame it for a wire protocol — is
// outside this crate's concern.

use std::io;

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// One instruction of a delta window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaInstruction<'a> {
    /// Copy `len` bytes of the window's source chunk starting at `offset`
    /// (relative to the window's absolute source offset).
    CopySource { offset: usize, len: usize },
    /// Insert literal bytes.
    Insert { data: &'a [u8] },
}

impl DeltaInstruction<'_> {
    /// Target bytes this instruction produces.
    pub fn len(&self) -> usize {
        match self {
            Self::CopySource { len, .. } => *len,
            Self::Insert { data } => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// Abstract consumer of the generated delta stream.
///
/// A sink failure aborts the pass immediately; the generator never emits
/// further windows after an error. Implementations may assume the call
/// order documented above and that each window is complete when
/// `window_end` arrives.
pub trait DeltaSink {
    /// A new window begins at the given absolute source offset.
    fn window_begin(&mut self, source_offset: u64) -> io::Result<()>;

    /// One instruction of the current window.
    fn instruction(&mut self, inst: DeltaInstruction<'_>) -> io::Result<()>;

    /// The current window is complete.
    fn window_end(&mut self) -> io::Result<()>;

    /// No more windows will follow.
    fn stream_end(&mut self) -> io::Result<()>;
}

// ---------------------------------------------------------------------------
// Counting sink
// ---------------------------------------------------------------------------

/// A sink that only tallies what flows through it.
///
/// The simplest complete implementation of the protocol; used by the CLI
/// for statistics and by benchmarks to drive the generator at full speed.
#[derive(Debug, Default, Clone)]
pub struct CountingSink {
    pub windows: u64,
    pub instructions: u64,
    pub copy_bytes: u64,
    pub insert_bytes: u64,
    pub ended: bool,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total target bytes the delta reconstructs.
    pub fn target_bytes(&self) -> u64 {
        self.copy_bytes + self.insert_bytes
    }
}

impl DeltaSink for CountingSink {
    fn window_begin(&mut self, _source_offset: u64) -> io::Result<()> {
        self.windows += 1;
        Ok(())
    }

    fn instruction(&mut self, inst: DeltaInstruction<'_>) -> io::Result<()> {
        self.instructions += 1;
        match inst {
            DeltaInstruction::CopySource { len, .. } => self.copy_bytes += len as u64,
            DeltaInstruction::Insert { data } => self.insert_bytes += data.len() as u64,
        }
        Ok(())
    }

    fn window_end(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn stream_end(&mut self) -> io::Result<()> {
        self.ended = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_lengths() {
        assert_eq!(DeltaInstruction::CopySource { offset: 4, len: 9 }.len(), 9);
        assert_eq!(DeltaInstruction::Insert { data: b"abc" }.len(), 3);
        assert!(DeltaInstruction::Insert { data: b"" }.is_empty());
    }

    #[test]
    fn counting_sink_tallies() {
        let mut sink = CountingSink::new();
        sink.window_begin(0).unwrap();
        sink.instruction(DeltaInstruction::CopySource { offset: 0, len: 10 })
            .unwrap();
        sink.instruction(DeltaInstruction::Insert { data: b"xy" })
            .unwrap();
        sink.window_end().unwrap();
        sink.stream_end().unwrap();

        assert_eq!(sink.windows, 1);
        assert_eq!(sink.instructions, 2);
        assert_eq!(sink.copy_bytes, 10);
        assert_eq!(sink.insert_bytes, 2);
        assert_eq!(sink.target_bytes(), 12);
        assert!(sink.ended);
    }
}
