//! Data sources.
//!
//! Two tiers produce the same logical table:
//! - `web`: scrape the acquisitions table from a web page (`html` + `selector`)
//! - `local`: read a CSV file from disk
//!
//! Neither tier raises. A failed load is a `SourceUnavailable` value that the
//! orchestrator logs before falling back to the next tier.

use std::fmt;

use crate::domain::{RawTable, SourceTag};

pub mod html;
pub mod local;
pub mod selector;
pub mod web;

pub use local::LocalLoader;
pub use web::WebFetcher;

/// A source tier produced no table. `cause` is meant for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnavailable {
    pub tag: SourceTag,
    pub cause: String,
}

impl SourceUnavailable {
    pub fn new(tag: SourceTag, cause: impl Into<String>) -> Self {
        Self {
            tag,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for SourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} source unavailable: {}", self.tag.label(), self.cause)
    }
}

pub type SourceResult = Result<RawTable, SourceUnavailable>;

/// One tier of the fallback chain.
pub trait TableSource {
    /// Provenance tag attached to tables from this source.
    fn tag(&self) -> SourceTag;

    /// Where the data comes from (URL, path), for logs.
    fn describe(&self) -> String;

    fn load(&self) -> SourceResult;
}
