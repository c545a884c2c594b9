//! Revdelta: windowed diff and delta encoding for version-control storage.
//!
//! The crate provides:
//! - A sequence-difference model with canonical block normalization (`diff`)
//! - A bounded-memory windowed delta generator and consumer protocol (`delta`)
//! - Chunked stream sources and file-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use revdelta::delta::{CountingSink, DeltaGenerator, GeneratorOptions};
//! use revdelta::io::StreamSource;
//!
//! let source = b"hello old world";
//! let target = b"hello new world";
//!
//! let mut sink = CountingSink::new();
//! let generator = DeltaGenerator::new(GeneratorOptions::default());
//! let windows = generator
//!     .run(
//!         &mut StreamSource::new(&source[..]),
//!         &mut StreamSource::new(&target[..]),
//!         &mut sink,
//!     )
//!     .unwrap();
//! assert_eq!(windows, 1);
//! ```

pub mod delta;
pub mod diff;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;
