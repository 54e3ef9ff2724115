//! Shared dashboard pipeline used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! web fetch -> local fallback -> normalize -> aggregate -> era totals
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::{info, warn};

use crate::aggregate::{Aggregation, EraTotals, YearBar, aggregate, era_totals};
use crate::data::{LocalLoader, TableSource, WebFetcher};
use crate::domain::{DashboardConfig, RawTable, SourceTag};
use crate::error::AppError;
use crate::normalize::{NormalizeReport, normalize};

/// All computed outputs of a single dashboard load.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: SourceTag,
    pub rows_loaded: usize,
    pub report: NormalizeReport,
    pub aggregation: Aggregation,
    pub era: EraTotals,
    /// Non-fatal problems worth showing to the user (failed source tiers).
    pub warnings: Vec<String>,
}

impl RunOutput {
    /// The ordered `(Year, Count)` series handed to presenters.
    pub fn bars(&self) -> Vec<YearBar> {
        self.aggregation.counts.to_bars()
    }
}

/// Execute the full pipeline against the configured web page and CSV file.
pub fn run_pipeline(config: &DashboardConfig) -> Result<RunOutput, AppError> {
    let web = WebFetcher::new(config.web.clone());
    let local = LocalLoader::new(&config.fallback_csv);

    let mut sources: Vec<&dyn TableSource> = Vec::with_capacity(2);
    if config.offline {
        info!("offline: skipping web source");
    } else {
        sources.push(&web);
    }
    sources.push(&local);

    run_with_sources(&sources, config)
}

/// Execute the pipeline with explicit source tiers, tried in order.
pub fn run_with_sources(sources: &[&dyn TableSource], config: &DashboardConfig) -> Result<RunOutput, AppError> {
    let mut warnings = Vec::new();
    let (table, source) = load_first(sources, &mut warnings)?;
    let rows_loaded = table.len();

    let normalized = normalize(table, &config.normalize)?;
    let aggregation = aggregate(&normalized.headers, &normalized.records);
    let era = era_totals(&aggregation.counts, config.split_year);

    info!(
        source = source.label(),
        rows = rows_loaded,
        kept = normalized.records.len(),
        years = aggregation.counts.len(),
        "pipeline complete"
    );

    Ok(RunOutput {
        source,
        rows_loaded,
        report: normalized.report,
        aggregation,
        era,
        warnings,
    })
}

fn load_first(
    sources: &[&dyn TableSource],
    warnings: &mut Vec<String>,
) -> Result<(RawTable, SourceTag), AppError> {
    for source in sources {
        info!(tag = source.tag().label(), from = %source.describe(), "loading table");
        match source.load() {
            Ok(table) => {
                info!(tag = source.tag().label(), rows = table.len(), "loaded table");
                return Ok((table, source.tag()));
            }
            Err(unavailable) => {
                warn!(tag = unavailable.tag.label(), cause = %unavailable.cause, "source unavailable");
                warnings.push(unavailable.to_string());
            }
        }
    }
    Err(AppError::all_sources_exhausted(warnings))
}
