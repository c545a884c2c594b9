// Chunked input sources and file-level helpers.
//
// The generator consumes its two inputs through the ChunkRead trait, whose
// `(bytes_read, more)` contract carries an explicit end-of-stream signal:
// a chunk that exactly fills the buffer still reports whether data remains,
// so a target whose length is an exact multiple of the window size is never
// confused with end-of-target. StreamSource adapts any std::io::Read with a
// one-byte lookahead to keep that signal truthful.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::delta::generator::{DeltaError, DeltaGenerator, GeneratorOptions};
use crate::delta::window::DeltaSink;

// ---------------------------------------------------------------------------
// Chunked reading
// ---------------------------------------------------------------------------

/// Result of one chunked read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Bytes placed into the caller's buffer.
    pub len: usize,
    /// Whether the stream has more data after this chunk.
    pub more: bool,
}

/// A byte-oriented sequential reader with an explicit end-of-stream signal.
pub trait ChunkRead {
    /// Fill `buf` as far as the stream allows.
    ///
    /// Must return `len > 0` or `more == false`; a zero-length chunk that
    /// claims more data would stall the consumer.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<Chunk>;
}

/// Adapts any [`Read`] to [`ChunkRead`].
///
/// Reads until the buffer is full or the stream ends; when the buffer
/// fills exactly, one byte of lookahead decides the `more` flag and is
/// returned as the first byte of the next chunk.
pub struct StreamSource<R: Read> {
    inner: R,
    lookahead: Option<u8>,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookahead: None,
        }
    }

    /// Unwrap the inner reader. Any lookahead byte is discarded.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ChunkRead for StreamSource<R> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<Chunk> {
        let mut filled = 0usize;
        if let Some(byte) = self.lookahead.take() {
            if buf.is_empty() {
                self.lookahead = Some(byte);
                return Ok(Chunk { len: 0, more: true });
            }
            buf[0] = byte;
            filled = 1;
        }

        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => return Ok(Chunk { len: filled, more: false }),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        // Buffer full: probe one byte so `more` reflects the stream state
        // rather than the chunk length.
        let mut probe = [0u8; 1];
        loop {
            match self.inner.read(&mut probe) {
                Ok(0) => return Ok(Chunk { len: filled, more: false }),
                Ok(_) => {
                    self.lookahead = Some(probe[0]);
                    return Ok(Chunk { len: filled, more: true });
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by [`diff_files`].
#[derive(Debug, Clone)]
pub struct DiffStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Target file size in bytes.
    pub target_size: u64,
    /// Number of delta windows pushed to the sink.
    pub windows: u64,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file-level operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, metadata).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Failure of the delta pass itself.
    #[error("delta error: {0}")]
    Delta(#[from] DeltaError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// diff_files
// ---------------------------------------------------------------------------

/// Run a windowed delta pass between two files, pushing windows to `sink`.
///
/// Both files are streamed through buffered readers; memory use is bounded
/// by the window size regardless of file sizes.
pub fn diff_files<K: DeltaSink>(
    source_path: &Path,
    target_path: &Path,
    sink: &mut K,
    opts: GeneratorOptions,
) -> Result<DiffStats, IoError> {
    let source_file = File::open(source_path)?;
    let source_size = source_file.metadata()?.len();
    let mut source = StreamSource::new(BufReader::with_capacity(BUF_SIZE, source_file));

    let target_file = File::open(target_path)?;
    let target_size = target_file.metadata()?.len();
    let mut target = StreamSource::new(BufReader::with_capacity(BUF_SIZE, target_file));

    let generator = DeltaGenerator::new(opts);
    let windows = generator.run(&mut source, &mut target, sink)?;

    Ok(DiffStats {
        source_size,
        target_size,
        windows,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::window::CountingSink;
    use std::io::Write;

    #[test]
    fn chunk_reads_drain_the_stream() {
        let mut src = StreamSource::new(&b"abcdefgh"[..]);
        let mut buf = [0u8; 3];

        let c = src.read_chunk(&mut buf).unwrap();
        assert_eq!((c.len, c.more), (3, true));
        assert_eq!(&buf, b"abc");

        let c = src.read_chunk(&mut buf).unwrap();
        assert_eq!((c.len, c.more), (3, true));
        assert_eq!(&buf, b"def");

        let c = src.read_chunk(&mut buf).unwrap();
        assert_eq!((c.len, c.more), (2, false));
        assert_eq!(&buf[..2], b"gh");

        let c = src.read_chunk(&mut buf).unwrap();
        assert_eq!((c.len, c.more), (0, false));
    }

    #[test]
    fn exact_multiple_reports_end_of_stream() {
        // Six bytes in two three-byte chunks: the second chunk fills the
        // buffer and must still report that nothing follows.
        let mut src = StreamSource::new(&b"abcdef"[..]);
        let mut buf = [0u8; 3];

        let c = src.read_chunk(&mut buf).unwrap();
        assert_eq!((c.len, c.more), (3, true));
        let c = src.read_chunk(&mut buf).unwrap();
        assert_eq!((c.len, c.more), (3, false));
    }

    #[test]
    fn lookahead_byte_is_not_lost() {
        let mut src = StreamSource::new(&b"abcd"[..]);
        let mut buf = [0u8; 2];
        let c = src.read_chunk(&mut buf).unwrap();
        assert_eq!((c.len, c.more, &buf[..]), (2, true, &b"ab"[..]));
        let c = src.read_chunk(&mut buf).unwrap();
        assert_eq!((c.len, c.more, &buf[..]), (2, false, &b"cd"[..]));
    }

    #[test]
    fn empty_stream_is_immediately_done() {
        let mut src = StreamSource::new(&b""[..]);
        let mut buf = [0u8; 8];
        let c = src.read_chunk(&mut buf).unwrap();
        assert_eq!((c.len, c.more), (0, false));
    }

    #[test]
    fn diff_files_reports_stats() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("source.bin");
        let target_path = dir.path().join("target.bin");

        let mut f = File::create(&source_path).unwrap();
        f.write_all(b"the quick brown fox").unwrap();
        let mut f = File::create(&target_path).unwrap();
        f.write_all(b"the quick red fox").unwrap();

        let mut sink = CountingSink::new();
        let stats = diff_files(
            &source_path,
            &target_path,
            &mut sink,
            GeneratorOptions::default(),
        )
        .unwrap();

        assert_eq!(stats.source_size, 19);
        assert_eq!(stats.target_size, 17);
        assert_eq!(stats.windows, 1);
        assert_eq!(sink.windows, 1);
        assert_eq!(sink.target_bytes(), 17);
        assert!(sink.ended);
    }

    #[test]
    fn diff_files_multi_window() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("source.bin");
        let target_path = dir.path().join("target.bin");

        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        std::fs::write(&source_path, &data).unwrap();
        std::fs::write(&target_path, &data).unwrap();

        let mut sink = CountingSink::new();
        let stats = diff_files(
            &source_path,
            &target_path,
            &mut sink,
            GeneratorOptions {
                window_size: 1024,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(stats.windows, 4);
        assert_eq!(sink.copy_bytes, 4096);
        assert_eq!(sink.insert_bytes, 0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut sink = CountingSink::new();
        let err = diff_files(
            Path::new("/nonexistent/source"),
            Path::new("/nonexistent/target"),
            &mut sink,
            GeneratorOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
