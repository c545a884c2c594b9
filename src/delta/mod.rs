// Windowed delta generation.
//
// - `buffer`    — random-access delta buffer with wraparound reads
// - `window`    — delta instructions and the consumer protocol
// - `generator` — the streaming window loop

pub mod buffer;
pub mod generator;
pub mod window;

// Re-export key types for convenience.
pub use buffer::DeltaBuffer;
pub use generator::{DeltaError, DeltaGenerator, GeneratorOptions, DEFAULT_WINDOW_SIZE};
pub use window::{CountingSink, DeltaInstruction, DeltaSink};
