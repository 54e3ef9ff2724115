//! Export year counts to CSV or JSON, and read the JSON back for plotting.
//!
//! The CSV is meant for spreadsheets; the JSON is the portable representation
//! consumed by `acq plot`.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{YearBar, YearCount};
use crate::app::pipeline::RunOutput;
use crate::domain::SourceTag;
use crate::error::AppError;

/// JSON export schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub source: SourceTag,
    pub split_year: i32,
    pub total: usize,
    pub counts: Vec<YearBar>,
}

impl CountsFile {
    pub fn from_run(run: &RunOutput) -> Self {
        Self {
            tool: "acq".to_string(),
            generated_at: Utc::now(),
            source: run.source,
            split_year: run.era.split_year,
            total: run.aggregation.counts.total(),
            counts: run.bars(),
        }
    }

    pub fn year_count(&self) -> YearCount {
        YearCount::from_pairs(self.counts.iter().map(|b| (b.year, b.count)))
    }
}

/// Write `year,count,era` rows, ascending by year.
pub fn write_counts_csv(path: &Path, counts: &YearCount, split_year: i32) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::config(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["year", "count", "era"])
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for (year, count) in counts.iter() {
        let era = if year > split_year { "after" } else { "before" };
        writer
            .write_record([year.to_string(), count.to_string(), era.to_string()])
            .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

pub fn write_counts_json(path: &Path, counts: &CountsFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create counts JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, counts)
        .map_err(|e| AppError::config(format!("Failed to write counts JSON: {e}")))?;
    Ok(())
}

pub fn read_counts_json(path: &Path) -> Result<CountsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open counts JSON '{}': {e}", path.display())))?;
    let counts: CountsFile =
        serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid counts JSON: {e}")))?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_export_is_ordered_and_tagged_by_era() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");
        let counts = YearCount::from_pairs([(2014, 9), (2010, 4), (2011, 1)]);
        write_counts_csv(&path, &counts, 2011).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "year,count,era\n2010,4,before\n2011,1,before\n2014,9,after\n");
    }

    #[test]
    fn json_export_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.json");
        let file = CountsFile {
            tool: "acq".to_string(),
            generated_at: Utc::now(),
            source: SourceTag::Csv,
            split_year: 2011,
            total: 3,
            counts: vec![YearBar { year: 1997, count: 1 }, YearBar { year: 2013, count: 2 }],
        };
        write_counts_json(&path, &file).unwrap();

        let back = read_counts_json(&path).unwrap();
        assert_eq!(back.source, SourceTag::Csv);
        assert_eq!(back.year_count().total(), 3);
        assert_eq!(back.year_count().years(), vec![1997, 2013]);
    }

    #[test]
    fn json_without_source_defaults_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.json");
        std::fs::write(
            &path,
            r#"{"tool":"acq","generated_at":"2024-01-01T00:00:00Z","split_year":2011,"total":1,"counts":[{"year":2001,"count":1}]}"#,
        )
        .unwrap();
        let back = read_counts_json(&path).unwrap();
        assert_eq!(back.source, SourceTag::None);
    }

    #[test]
    fn unreadable_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_counts_json(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }
}
