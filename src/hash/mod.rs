//! Perceptual hashing and reference matching.
//!
//! This module provides:
//! - A size-parameterized DCT-II with its own cosine table
//! - 64-bit DCT fingerprints of character art crops
//! - Hamming-distance matching against the reference table

pub mod dct;
pub mod fingerprint;
pub mod matcher;

pub use dct::CosineTable;
pub use fingerprint::{Fingerprint, PerceptualHasher};
pub use matcher::{Candidate, HashMatcher, MatchResult, UNMATCHED_DISTANCE};
