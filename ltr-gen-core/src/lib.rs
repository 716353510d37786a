//! Name generation from LTR trigram letter-frequency files.
//!
//! This crate provides the whole pipeline, from raw bytes to names:
//! - Decoding of the binary LTR layout into a three-level trigram model
//! - Repair of the known running-sum defect in the singles tables
//! - Reconstruction of the integer counts behind the stored probabilities
//! - Seeded, reproducible name sampling with backtracking
//! - A plain-text dump of the tables for diagnostics

/// Trigram model, its processing passes and the name generator.
pub mod model;

/// Little-endian binary32 codec for LTR streams.
pub mod codec;

/// Error type shared by every fallible operation.
pub mod error;

/// Human-readable rendering of a model.
pub mod presenter;

/// I/O utilities (file loading, cache paths).
///
/// Not exposed
pub(crate) mod io;

pub use error::{LtrError, Result};
