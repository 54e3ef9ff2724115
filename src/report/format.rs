//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline stays free of presentation concerns
//! - output changes are localized (important for snapshot tests)

use crate::aggregate::{Aggregation, EraTotals};
use crate::app::pipeline::RunOutput;

/// Format the run summary: provenance, cleaning diagnostics, era totals.
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== acq - Acquisitions through the years ===\n");
    out.push_str(&format!(
        "Source: {} ({})\n",
        run.source.label(),
        run.source.description()
    ));

    let report = &run.report;
    out.push_str(&format!(
        "Rows: loaded={} | kept={} | dropped={}\n",
        run.rows_loaded,
        run.aggregation.counts.total(),
        report.dropped
    ));
    out.push_str(&format!(
        "Year column: {}{}\n",
        report.year_source.column_name(),
        if report.strict { "" } else { " (lenient coercion)" }
    ));
    if report.legacy_repaired {
        out.push_str("Legacy repair: record #11 set to 2000\n");
    }
    if report.overrides_applied > 0 {
        out.push_str(&format!("Overrides applied: {}\n", report.overrides_applied));
    }
    if let Some(col) = &run.aggregation.entity_column {
        out.push_str(&format!("Entity column: {col}\n"));
    }

    out.push('\n');
    out.push_str(&format_era_totals(&run.era));

    if !run.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for w in &run.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

pub fn format_era_totals(era: &EraTotals) -> String {
    format!(
        "Up to {split}: {before} acquisitions over {yb} year(s) (avg {mb:.1}/yr)\n\
         After {split}: {after} acquisitions over {ya} year(s) (avg {ma:.1}/yr)\n",
        split = era.split_year,
        before = era.before,
        yb = era.years_before,
        mb = era.mean_before(),
        after = era.after,
        ya = era.years_after,
        ma = era.mean_after(),
    )
}

/// Year/count table with the first few entity names per year.
pub fn format_year_table(agg: &Aggregation, max_names: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<6} {:>5}  {}\n", "year", "count", "acquired"));
    out.push_str(&format!("{:-<6} {:->5}  {:-<30}\n", "", "", ""));

    for (year, count) in agg.counts.iter() {
        let names = agg.entities_in(year);
        let mut listed: Vec<String> = names.iter().take(max_names).map(|n| truncate(n, 24)).collect();
        if names.len() > max_names {
            listed.push(format!("+{} more", names.len() - max_names));
        }
        out.push_str(format!("{year:<6} {count:>5}  {}", listed.join(", ")).trim_end());
        out.push('\n');
    }

    out
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
