//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw tables as produced by the sources (`RawTable`, `RawRecord`)
//! - normalized records carrying an integer year (`NormalizedRecord`)
//! - provenance (`SourceTag`) and run configuration (`DashboardConfig`)

pub mod types;

pub use types::*;
