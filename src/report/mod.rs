//! Reporting utilities: run summaries, year tables, and the era narrative.

pub mod format;

pub use format::*;

use crate::aggregate::EraTotals;

/// Sidebar text describing the two eras.
pub fn era_narrative(era: &EraTotals) -> String {
    let trend = if era.mean_after() > era.mean_before() {
        "picked up"
    } else if era.mean_after() < era.mean_before() {
        "slowed down"
    } else {
        "held steady"
    };
    format!(
        "Bars after {split} are highlighted to mark the change of leadership that year. \
         The pace of acquisitions {trend}: {mb:.1} per year up to {split}, \
         {ma:.1} per year since.",
        split = era.split_year,
        mb = era.mean_before(),
        ma = era.mean_after(),
    )
}
