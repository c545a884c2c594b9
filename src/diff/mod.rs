// Sequence difference model.
//
// Everything that turns two indexed sequences into a canonical block list:
//
// - `compare`   — SequenceComparer trait; byte and line implementations
// - `block`     — difference blocks and list well-formedness
// - `myers`     — default pluggable edit-script primitive
// - `normalize` — join/shift canonicalization of raw block lists

pub mod block;
pub mod compare;
pub mod myers;
pub mod normalize;

// Re-export key types for convenience.
pub use block::{BlockKind, DiffBlock};
pub use compare::{BytesComparer, CompareFlags, LineComparer, SequenceComparer};
pub use myers::{DiffAlgorithm, Myers};
pub use normalize::normalize;
