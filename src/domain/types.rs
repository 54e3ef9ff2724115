//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - produced by either source tier (web page or local CSV)
//! - passed through normalization and aggregation without copies of the schema
//! - exported to JSON/CSV and reloaded later for plotting

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default page listing the acquisitions.
pub const DEFAULT_SOURCE_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_mergers_and_acquisitions_by_Apple";

/// Default local fallback file (relative to the working directory).
pub const DEFAULT_FALLBACK_CSV: &str = "data.csv";

/// Browser-like identification; some hosts reject requests without one.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Preferred entity column name.
pub const ENTITY_COLUMN: &str = "Company";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Last year of the first era. Bars for later years are highlighted.
pub const DEFAULT_SPLIT_YEAR: i32 = 2011;

/// Where the table came from. Used for labeling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Web,
    Csv,
    #[default]
    None,
}

impl SourceTag {
    pub fn label(self) -> &'static str {
        match self {
            SourceTag::Web => "WEB",
            SourceTag::Csv => "CSV",
            SourceTag::None => "NONE",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SourceTag::Web => "live web page",
            SourceTag::Csv => "local CSV fallback",
            SourceTag::None => "no data",
        }
    }
}

/// One row as scraped or loaded. Values line up with `RawTable::headers`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(String::as_str)
    }
}

/// Unprocessed tabular data. Schema is whatever the source provided.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self { headers, records }
    }

    /// Exact (case-sensitive) header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Column naming the acquired entity: `Company` when present, else the first column.
    pub fn entity_column(&self) -> Option<usize> {
        entity_column_index(&self.headers)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Index of the entity column for a header row (see `RawTable::entity_column`).
pub fn entity_column_index(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| h == ENTITY_COLUMN)
        .or(if headers.is_empty() { None } else { Some(0) })
}

/// A record that survived year coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Always within `1000..=9999`.
    pub year: i32,
    pub fields: Vec<String>,
}

/// A four-digit calendar year (`1000..=9999`), surrounding whitespace ignored.
pub fn parse_year(s: &str) -> Option<i32> {
    let year = s.trim().parse::<i32>().ok()?;
    (1000..=9999).contains(&year).then_some(year)
}

/// Explicit correction for one entity's year, keyed by the entity column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearOverride {
    pub entity: String,
    pub year: String,
}

impl FromStr for YearOverride {
    type Err = String;

    /// Parses `"<entity>=<year>"`. The entity may itself contain `=`; the last one splits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (entity, year) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("Invalid override '{s}': expected <entity>=<year>."))?;
        let entity = entity.trim();
        let year = year.trim();
        if entity.is_empty() || year.is_empty() {
            return Err(format!("Invalid override '{s}': entity and year must be non-empty."));
        }
        let year = parse_year(year)
            .ok_or_else(|| format!("Invalid override '{s}': year must be a four-digit year, got '{year}'."))?;
        Ok(Self {
            entity: entity.to_string(),
            year: year.to_string(),
        })
    }
}

/// Remote source settings.
#[derive(Debug, Clone)]
pub struct WebSourceConfig {
    pub url: String,
    pub table: crate::data::selector::TableRule,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for WebSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            table: crate::data::selector::TableRule::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Normalizer knobs.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Force record index 11 to year 2000 (historical scrape fix).
    pub legacy_repair: bool,
    pub overrides: Vec<YearOverride>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            legacy_repair: true,
            overrides: Vec::new(),
        }
    }
}

/// Fully resolved settings for one dashboard load.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub web: WebSourceConfig,
    /// Skip the web tier entirely.
    pub offline: bool,
    pub fallback_csv: PathBuf,
    pub normalize: NormalizeConfig,
    pub split_year: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            web: WebSourceConfig::default(),
            offline: false,
            fallback_csv: PathBuf::from(DEFAULT_FALLBACK_CSV),
            normalize: NormalizeConfig::default(),
            split_year: DEFAULT_SPLIT_YEAR,
        }
    }
}
