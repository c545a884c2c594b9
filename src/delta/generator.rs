// Windowed delta generator.
//
// Drives the whole diff-and-encode pipeline over inputs too large to hold
// in memory: per step it reads one bounded chunk from the target and one
// from the source, diffs them as byte sequences, normalizes the block
// list, and pushes one delta window to the consumer. Termination is
// asymmetric: the loop stops when the target is exhausted, however much
// source remains.
//
// Literal (inserted) content passes through the window's delta buffer in
// period-compressed form: a repeating region is appended once and
// materialized back through a wraparound read, so the encode side uses the
// same self-referential copy semantics a decoder applies.

use std::io;

use log::debug;
use thiserror::Error;

use crate::diff::block::DiffBlock;
use crate::diff::compare::BytesComparer;
use crate::diff::myers::{DiffAlgorithm, Myers};
use crate::diff::normalize::normalize;
use crate::io::ChunkRead;

use super::buffer::DeltaBuffer;
use super::window::{DeltaInstruction, DeltaSink};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Default window size (100 KiB).
pub const DEFAULT_WINDOW_SIZE: usize = 102_400;

/// Configuration for the windowed delta generator.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Chunk size read from source and target per window; this is the
    /// memory ceiling of a diff pass.
    pub window_size: usize,
    /// Block-merge tolerance handed to the normalizer. 0 merges only
    /// directly adjacent blocks.
    pub gutter: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            gutter: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a delta pass.
///
/// There is no partial success: the pass either completes with a
/// well-formed window sequence terminated by `stream_end`, or it stops at
/// the first failure without flushing a partial window.
#[derive(Debug, Error)]
pub enum DeltaError {
    #[error("source read failed: {0}")]
    SourceRead(#[source] io::Error),
    #[error("target read failed: {0}")]
    TargetRead(#[source] io::Error),
    #[error("delta consumer failed: {0}")]
    Consumer(#[source] io::Error),
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Streaming diff/delta generator.
///
/// Generic over the edit-script primitive; [`Myers`] is the default. One
/// generator instance drives one diff pass at a time and owns every buffer
/// and block list for the duration of the pass, so independent passes may
/// run on separate threads without shared state.
pub struct DeltaGenerator<A = Myers> {
    opts: GeneratorOptions,
    algorithm: A,
}

impl DeltaGenerator<Myers> {
    pub fn new(opts: GeneratorOptions) -> Self {
        Self {
            opts,
            algorithm: Myers::default(),
        }
    }
}

impl<A: DiffAlgorithm> DeltaGenerator<A> {
    /// Create a generator with a custom edit-script primitive.
    pub fn with_algorithm(opts: GeneratorOptions, algorithm: A) -> Self {
        Self { opts, algorithm }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.opts
    }

    /// Run one complete diff pass, returning the number of windows pushed.
    ///
    /// Reads source and target in window-sized chunks, emits one delta
    /// window per step, and finishes with `stream_end` once the target is
    /// exhausted. The running absolute source offset accumulates across
    /// windows; it tags each `window_begin`.
    pub fn run<S, T, K>(
        &self,
        source: &mut S,
        target: &mut T,
        sink: &mut K,
    ) -> Result<u64, DeltaError>
    where
        S: ChunkRead,
        T: ChunkRead,
        K: DeltaSink,
    {
        assert!(self.opts.window_size > 0, "window size must be nonzero");

        let mut source_buf = vec![0u8; self.opts.window_size];
        let mut target_buf = vec![0u8; self.opts.window_size];
        let mut buffer = DeltaBuffer::new();
        let mut literal = Vec::new();

        let mut source_offset = 0u64;
        let mut windows = 0u64;

        loop {
            // Target exhaustion drives termination, so the target chunk is
            // read first; a terminal read must not consume a source chunk.
            let t = target
                .read_chunk(&mut target_buf)
                .map_err(DeltaError::TargetRead)?;
            if t.len == 0 {
                if !t.more {
                    sink.stream_end().map_err(DeltaError::Consumer)?;
                    return Ok(windows);
                }
                // Zero bytes but the stream claims more: re-read. Length
                // alone never decides termination.
                continue;
            }
            let s = source
                .read_chunk(&mut source_buf)
                .map_err(DeltaError::SourceRead)?;

            let source_chunk = &source_buf[..s.len];
            let target_chunk = &target_buf[..t.len];

            let cmp = BytesComparer::new(source_chunk, target_chunk);
            let mut blocks = self.algorithm.diff(&cmp);
            normalize(&cmp, self.opts.gutter, &mut blocks);

            buffer.clear();
            sink.window_begin(source_offset)
                .map_err(DeltaError::Consumer)?;
            emit_window(
                sink,
                &mut buffer,
                &mut literal,
                source_chunk,
                target_chunk,
                &blocks,
            )
            .map_err(DeltaError::Consumer)?;
            sink.window_end().map_err(DeltaError::Consumer)?;

            debug!(
                "window {windows} at source offset {source_offset}: {} source bytes, \
                 {} target bytes, {} blocks",
                s.len,
                t.len,
                blocks.len()
            );

            source_offset += s.len as u64;
            windows += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Block-to-instruction translation
// ---------------------------------------------------------------------------

/// Translate a canonical block list into copy/insert instructions.
///
/// Regions outside any block are implicit matches and copy from the source
/// verbatim; block target content becomes an insert; source-only blocks
/// are deletions and emit nothing.
fn emit_window<K: DeltaSink>(
    sink: &mut K,
    buffer: &mut DeltaBuffer,
    literal: &mut Vec<u8>,
    source_chunk: &[u8],
    target_chunk: &[u8],
    blocks: &[DiffBlock],
) -> io::Result<()> {
    let mut spos = 0usize;
    let mut tpos = 0usize;

    for b in blocks {
        let matched = b.source_start - spos;
        debug_assert_eq!(matched, b.target_start - tpos, "matched run skewed at {b}");
        if matched > 0 {
            sink.instruction(DeltaInstruction::CopySource {
                offset: spos,
                len: matched,
            })?;
        }
        if b.target_len() > 0 {
            insert_literal(sink, buffer, literal, &target_chunk[b.target_start..b.target_end])?;
        }
        spos = b.source_end;
        tpos = b.target_end;
    }

    let tail = source_chunk.len() - spos;
    debug_assert_eq!(tail, target_chunk.len() - tpos, "matched tail skewed");
    if tail > 0 {
        sink.instruction(DeltaInstruction::CopySource {
            offset: spos,
            len: tail,
        })?;
    }
    Ok(())
}

/// Push inserted content through the delta buffer.
///
/// Only the shortest cyclic period of the data is appended; the full
/// literal is materialized by a wraparound read, which is how the delta
/// format expresses repetition.
fn insert_literal<K: DeltaSink>(
    sink: &mut K,
    buffer: &mut DeltaBuffer,
    literal: &mut Vec<u8>,
    data: &[u8],
) -> io::Result<()> {
    let offset = buffer.len();
    let period = cyclic_period(data);
    buffer.append(&data[..period]);

    literal.clear();
    buffer.read_into(offset, data.len(), literal);
    debug_assert_eq!(literal.as_slice(), data);

    sink.instruction(DeltaInstruction::Insert {
        data: literal.as_slice(),
    })
}

/// Shortest `p` such that `data[k] == data[k - p]` for all `k >= p`, i.e.
/// the whole slice is a cyclic extension of its first `p` bytes.
/// Computed as length minus the longest proper border (KMP prefix table).
fn cyclic_period(data: &[u8]) -> usize {
    let n = data.len();
    if n <= 1 {
        return n;
    }
    let mut border = vec![0usize; n];
    let mut k = 0usize;
    for i in 1..n {
        while k > 0 && data[i] != data[k] {
            k = border[k - 1];
        }
        if data[i] == data[k] {
            k += 1;
        }
        border[i] = k;
    }
    n - border[n - 1]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::StreamSource;

    /// Records the full notification sequence for assertions.
    #[derive(Debug, Default)]
    struct RecordingSink {
        events: Vec<Event>,
        fail_on_instruction: bool,
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        Begin(u64),
        Copy { offset: usize, len: usize },
        Insert(Vec<u8>),
        End,
        StreamEnd,
    }

    impl DeltaSink for RecordingSink {
        fn window_begin(&mut self, source_offset: u64) -> io::Result<()> {
            self.events.push(Event::Begin(source_offset));
            Ok(())
        }

        fn instruction(&mut self, inst: DeltaInstruction<'_>) -> io::Result<()> {
            if self.fail_on_instruction {
                return Err(io::Error::other("sink rejected instruction"));
            }
            self.events.push(match inst {
                DeltaInstruction::CopySource { offset, len } => Event::Copy { offset, len },
                DeltaInstruction::Insert { data } => Event::Insert(data.to_vec()),
            });
            Ok(())
        }

        fn window_end(&mut self) -> io::Result<()> {
            self.events.push(Event::End);
            Ok(())
        }

        fn stream_end(&mut self) -> io::Result<()> {
            self.events.push(Event::StreamEnd);
            Ok(())
        }
    }

    fn run_pass(source: &[u8], target: &[u8], opts: GeneratorOptions) -> (u64, RecordingSink) {
        let mut sink = RecordingSink::default();
        let generator = DeltaGenerator::new(opts);
        let windows = generator
            .run(
                &mut StreamSource::new(source),
                &mut StreamSource::new(target),
                &mut sink,
            )
            .expect("pass failed");
        (windows, sink)
    }

    #[test]
    fn identical_inputs_copy_verbatim() {
        let data = b"identical content";
        let (windows, sink) = run_pass(data, data, GeneratorOptions::default());
        assert_eq!(windows, 1);
        assert_eq!(
            sink.events,
            vec![
                Event::Begin(0),
                Event::Copy {
                    offset: 0,
                    len: data.len()
                },
                Event::End,
                Event::StreamEnd,
            ]
        );
    }

    #[test]
    fn small_replace_in_the_middle() {
        let (_, sink) = run_pass(b"hello old world", b"hello new world", GeneratorOptions::default());
        assert_eq!(
            sink.events,
            vec![
                Event::Begin(0),
                Event::Copy { offset: 0, len: 6 },
                Event::Insert(b"new".to_vec()),
                Event::Copy { offset: 9, len: 6 },
                Event::End,
                Event::StreamEnd,
            ]
        );
    }

    #[test]
    fn empty_target_emits_only_stream_end() {
        let (windows, sink) = run_pass(b"some source", b"", GeneratorOptions::default());
        assert_eq!(windows, 0);
        assert_eq!(sink.events, vec![Event::StreamEnd]);
    }

    #[test]
    fn empty_source_is_a_pure_insert() {
        let (windows, sink) = run_pass(b"", b"hello", GeneratorOptions::default());
        assert_eq!(windows, 1);
        assert_eq!(
            sink.events,
            vec![
                Event::Begin(0),
                Event::Insert(b"hello".to_vec()),
                Event::End,
                Event::StreamEnd,
            ]
        );
    }

    #[test]
    fn repeated_insert_materializes_through_wraparound() {
        // The inserted region is a pure repetition; the delta buffer holds
        // one period and the wraparound read rebuilds the literal.
        let (_, sink) = run_pass(b"ab", b"aXYXYXYXYb", GeneratorOptions::default());
        assert_eq!(
            sink.events,
            vec![
                Event::Begin(0),
                Event::Copy { offset: 0, len: 1 },
                Event::Insert(b"XYXYXYXY".to_vec()),
                Event::Copy { offset: 1, len: 1 },
                Event::End,
                Event::StreamEnd,
            ]
        );
    }

    #[test]
    fn multiple_windows_accumulate_source_offsets() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let (windows, sink) = run_pass(
            &data,
            &data,
            GeneratorOptions {
                window_size: 256,
                ..Default::default()
            },
        );
        assert_eq!(windows, 4);
        let begins: Vec<u64> = sink
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Begin(off) => Some(*off),
                _ => None,
            })
            .collect();
        assert_eq!(begins, vec![0, 256, 512, 768]);
        assert_eq!(*sink.events.last().unwrap(), Event::StreamEnd);
    }

    #[test]
    fn target_longer_than_source_continues_with_inserts() {
        let (windows, sink) = run_pass(
            b"aaaa",
            b"aaaabbbb",
            GeneratorOptions {
                window_size: 4,
                ..Default::default()
            },
        );
        assert_eq!(windows, 2);
        assert_eq!(
            sink.events,
            vec![
                Event::Begin(0),
                Event::Copy { offset: 0, len: 4 },
                Event::End,
                // Source exhausted: the second window aligns against an
                // empty source chunk and inserts everything.
                Event::Begin(4),
                Event::Insert(b"bbbb".to_vec()),
                Event::End,
                Event::StreamEnd,
            ]
        );
    }

    #[test]
    fn consumer_failure_aborts_the_pass() {
        let mut sink = RecordingSink {
            fail_on_instruction: true,
            ..Default::default()
        };
        let generator = DeltaGenerator::new(GeneratorOptions::default());
        let err = generator
            .run(
                &mut StreamSource::new(&b"abc"[..]),
                &mut StreamSource::new(&b"abd"[..]),
                &mut sink,
            )
            .unwrap_err();
        assert!(matches!(err, DeltaError::Consumer(_)));
        // The failure happened mid-window: no window_end, no stream_end.
        assert_eq!(sink.events, vec![Event::Begin(0)]);
    }

    #[test]
    fn cyclic_period_detection() {
        assert_eq!(cyclic_period(b""), 0);
        assert_eq!(cyclic_period(b"a"), 1);
        assert_eq!(cyclic_period(b"aaaa"), 1);
        assert_eq!(cyclic_period(b"abab"), 2);
        assert_eq!(cyclic_period(b"ababa"), 2);
        assert_eq!(cyclic_period(b"abcab"), 3);
        assert_eq!(cyclic_period(b"abcd"), 4);
    }

    #[test]
    #[should_panic(expected = "window size must be nonzero")]
    fn zero_window_size_is_a_defect() {
        let generator = DeltaGenerator::new(GeneratorOptions {
            window_size: 0,
            ..Default::default()
        });
        let _ = generator.run(
            &mut StreamSource::new(&b""[..]),
            &mut StreamSource::new(&b""[..]),
            &mut CountingSinkForTest,
        );
    }

    struct CountingSinkForTest;
    impl DeltaSink for CountingSinkForTest {
        fn window_begin(&mut self, _: u64) -> io::Result<()> {
            Ok(())
        }
        fn instruction(&mut self, _: DeltaInstruction<'_>) -> io::Result<()> {
            Ok(())
        }
        fn window_end(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn stream_end(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
