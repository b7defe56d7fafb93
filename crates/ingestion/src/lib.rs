//! Data ingestion and normalization for the WSE processing pipeline.
//!
//! This crate handles:
//! - Logger-export parsing behind a format-polymorphic trait
//! - Column auto-detection for heterogeneous exports
//! - Nearest-neighbor pairing of water and barometric series

pub mod merger;
pub mod normalizer;

pub use merger::{merge, MergeResult};
pub use normalizer::{normalize, LoggerFormat, NormalizerOptions, ReadingNormalizer};
