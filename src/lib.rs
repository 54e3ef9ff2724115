//! `acq-dashboard` library crate.
//!
//! The binary (`acq`) is a thin wrapper around this library so that:
//!
//! - the load/clean/count pipeline is testable without spawning processes
//! - the text and TUI front-ends share one code path

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod normalize;
pub mod plot;
pub mod report;
pub mod tui;
