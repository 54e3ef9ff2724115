//! Input/output helpers.
//!
//! - year-count exports (CSV/JSON) and JSON reload (`export`)

pub mod export;

pub use export::*;
