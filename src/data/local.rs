//! Local fallback source: a CSV file with a header row.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::data::{SourceResult, SourceUnavailable, TableSource};
use crate::domain::{RawRecord, RawTable, SourceTag};

pub struct LocalLoader {
    path: PathBuf,
}

impl LocalLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for LocalLoader {
    fn tag(&self) -> SourceTag {
        SourceTag::Csv
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> SourceResult {
        read_table(&self.path).map_err(|cause| SourceUnavailable::new(SourceTag::Csv, cause))
    }
}

fn read_table(path: &Path) -> Result<RawTable, String> {
    let file = File::open(path).map_err(|e| format!("cannot open '{}': {e}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("failed to read CSV header of '{}': {e}", path.display()))?
        .iter()
        .map(normalize_header_name)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(format!("'{}' has no header row", path.display()));
    }

    let width = headers.len();
    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, plus the header line.
        let line = idx + 2;
        let record = result.map_err(|e| format!("malformed CSV record at line {line}: {e}"))?;
        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        fields.resize(width, String::new());
        records.push(RawRecord::new(fields));
    }

    debug!(path = %path.display(), rows = records.len(), "loaded local table");
    Ok(RawTable::new(headers, records))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM. Case is
    // preserved: `Date`, `year` and `Year` mean different things downstream.
    name.trim().trim_start_matches('\u{feff}').to_string()
}
