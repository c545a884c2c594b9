// Random-access delta buffer.
//
// A growable append-only byte buffer with one distinctive read rule: a read
// running past the buffered extent is satisfied by cyclic repetition of the
// output produced so far, not by zero fill or an error. A copy whose length
// exceeds the distance back to its own data therefore reproduces a
// repeating pattern — the run-length trick of the delta format — and the
// encoder materializes literal content with exactly the semantics a decoder
// applies to overlapping self-copies.

// ---------------------------------------------------------------------------
// DeltaBuffer
// ---------------------------------------------------------------------------

/// Append-only byte buffer with wraparound reads.
#[derive(Debug, Default)]
pub struct DeltaBuffer {
    data: Vec<u8>,
}

impl DeltaBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a buffer pre-seeded with initial content.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Current byte count.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Grow the buffer by concatenation. Never overwrites existing bytes.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Drop all content, keeping the allocation for the next window.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Read `len` bytes starting at `offset`, appending them to `out`.
    ///
    /// Bytes past the buffered extent are filled by cyclic repetition:
    /// output position `k` beyond the `available` physical bytes takes the
    /// value of output position `k - available`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` lies beyond the buffer, or if `len > 0` while no
    /// byte is available at `offset` — wraparound needs at least one byte
    /// to repeat, and such a read indicates an encoder defect.
    pub fn read_into(&self, offset: usize, len: usize, out: &mut Vec<u8>) {
        assert!(
            offset <= self.data.len(),
            "read offset {offset} beyond buffer length {}",
            self.data.len()
        );
        let available = self.data.len() - offset;
        assert!(
            len == 0 || available > 0,
            "read of {len} bytes against empty extent at offset {offset}"
        );

        let direct = len.min(available);
        let start = out.len();
        out.extend_from_slice(&self.data[offset..offset + direct]);

        // Cyclic fill: replicate the output so far forward.
        for k in direct..len {
            let byte = out[start + k - available];
            out.push(byte);
        }
    }

    /// Read `len` bytes starting at `offset` into a fresh vector.
    /// See [`DeltaBuffer::read_into`] for the wraparound rule and panics.
    pub fn read(&self, offset: usize, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        self.read_into(offset, len, &mut out);
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
