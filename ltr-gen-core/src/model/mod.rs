//! Trigram model for LTR files.
//!
//! The model is built once and then only read:
//! - Decoding (`Model`)
//! - Repair of the singles middle/end columns (`corrector`)
//! - Count reconstruction (`reconstructor`)
//! - Name sampling (`NameSampler`) driven by a seeded `Lcg`
//! - A high-level generation interface (`Generator`)

/// The fixed 28-symbol LTR alphabet.
pub mod alphabet;

/// Repair of the encoder's running-sum defect.
pub mod corrector;

/// High-level interface: load, process, generate.
pub mod generator;

/// Generation settings (seed, passes, cache).
pub mod generation_input;

/// Decoded model and the LTR byte layout.
pub mod ltr_model;

/// Inference of sample counts and totals from pdf columns.
pub mod reconstructor;

/// The linear congruential generator driving sampling.
pub mod rng;

/// Trigram walk with backtracking.
pub mod sampler;

/// Probability columns and per-context tables.
pub mod table;
