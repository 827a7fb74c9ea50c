//! # Core models and io helpers for bwmat.
//!
//! This small crate holds the pieces every other bwmat crate leans on: the chromosome size
//! table, the half-open [Interval] model, and a handful of io utilities for discovering track
//! files and reading (optionally gzipped) text inputs.
//!
pub mod errors;
pub mod models;
pub mod utils;

// re-expose the most used types
pub use errors::{CoreError, Result};
pub use models::{ChromSizes, Interval};
