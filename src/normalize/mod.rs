//! Year normalization.
//!
//! Turns a `RawTable` from either source into records carrying an integer
//! year. Steps, in order:
//!
//! 1. pick the year source: `Date` (last 4 characters) > `year` > `Year`
//! 2. legacy repair: record index 11 is forced to `"2000"`
//! 3. explicit overrides keyed by entity name
//! 4. coercion: strict parse of the whole column, else per-record lenient
//!    parse that drops what does not parse
//!
//! Only a missing temporal column is fatal. Dropped records are counted.

use tracing::{debug, warn};

use crate::domain::{NormalizeConfig, NormalizedRecord, RawTable, YearOverride, parse_year};
use crate::error::AppError;

/// Position of the record patched by the legacy repair.
pub const LEGACY_REPAIR_INDEX: usize = 11;
/// Year written by the legacy repair.
pub const LEGACY_REPAIR_YEAR: &str = "2000";

/// Column the year strings were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSource {
    /// `Date` column; the year is its last four characters.
    Date,
    /// `year` column, taken verbatim.
    LowerYear,
    /// Pre-existing `Year` column.
    Year,
}

impl YearSource {
    pub fn column_name(self) -> &'static str {
        match self {
            YearSource::Date => "Date",
            YearSource::LowerYear => "year",
            YearSource::Year => "Year",
        }
    }
}

/// What normalization did to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    pub year_source: YearSource,
    pub rows_in: usize,
    /// Whether the legacy index-11 repair touched a record.
    pub legacy_repaired: bool,
    pub overrides_applied: usize,
    /// `false` when the column needed lenient, per-record coercion.
    pub strict: bool,
    /// Records dropped because their year did not parse.
    pub dropped: usize,
}

/// Normalized table: original headers, surviving records, and a report.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub headers: Vec<String>,
    pub records: Vec<NormalizedRecord>,
    pub report: NormalizeReport,
}

pub fn normalize(table: RawTable, config: &NormalizeConfig) -> Result<Normalized, AppError> {
    let (year_source, col) = resolve_year_source(&table)?;
    debug!(source = year_source.column_name(), "resolved year column");

    let mut years: Vec<String> = table
        .records
        .iter()
        .map(|r| {
            let value = r.get(col).unwrap_or("");
            match year_source {
                YearSource::Date => last_chars(value, 4),
                YearSource::LowerYear | YearSource::Year => value.to_string(),
            }
        })
        .collect();

    let legacy_repaired = config.legacy_repair && apply_legacy_repair(&mut years);
    if legacy_repaired {
        debug!(
            index = LEGACY_REPAIR_INDEX,
            year = LEGACY_REPAIR_YEAR,
            "applied legacy year repair"
        );
    }

    let overrides_applied = apply_overrides(&table, &mut years, &config.overrides);

    let rows_in = table.records.len();
    let year_col = table.column_index("Year");
    let (parsed, strict) = coerce_years(&years);

    let mut records = Vec::with_capacity(rows_in);
    for (record, year) in table.records.into_iter().zip(parsed) {
        let Some(year) = year else { continue };
        let mut fields = record.fields;
        if let Some(idx) = year_col {
            if let Some(slot) = fields.get_mut(idx) {
                *slot = year.to_string();
            }
        }
        records.push(NormalizedRecord { year, fields });
    }

    let dropped = rows_in - records.len();
    if dropped > 0 {
        debug!(dropped, "dropped records with unparseable years");
    }

    Ok(Normalized {
        headers: table.headers,
        records,
        report: NormalizeReport {
            year_source,
            rows_in,
            legacy_repaired,
            overrides_applied,
            strict,
            dropped,
        },
    })
}

fn resolve_year_source(table: &RawTable) -> Result<(YearSource, usize), AppError> {
    for source in [YearSource::Date, YearSource::LowerYear, YearSource::Year] {
        if let Some(idx) = table.column_index(source.column_name()) {
            return Ok((source, idx));
        }
    }
    Err(AppError::schema_missing(&table.headers))
}

/// Last `n` characters (the whole string when shorter).
fn last_chars(s: &str, n: usize) -> String {
    let len = s.chars().count();
    s.chars().skip(len.saturating_sub(n)).collect()
}

// NOTE: positional patch for one mis-scraped row of the historical source
// table. Any upstream reordering silently moves it onto another record.
fn apply_legacy_repair(years: &mut [String]) -> bool {
    match years.get_mut(LEGACY_REPAIR_INDEX) {
        Some(slot) => {
            *slot = LEGACY_REPAIR_YEAR.to_string();
            true
        }
        None => false,
    }
}

fn apply_overrides(table: &RawTable, years: &mut [String], overrides: &[YearOverride]) -> usize {
    if overrides.is_empty() {
        return 0;
    }
    let Some(entity_col) = table.entity_column() else {
        warn!("year overrides ignored: table has no entity column");
        return 0;
    };

    let mut applied = 0;
    for o in overrides {
        let mut hits = 0;
        for (record, year) in table.records.iter().zip(years.iter_mut()) {
            if record.get(entity_col).is_some_and(|v| v == o.entity) {
                *year = o.year.clone();
                hits += 1;
            }
        }
        if hits == 0 {
            warn!(entity = %o.entity, "year override matched no record");
        }
        applied += hits;
    }
    applied
}

/// Parse every year. Returns per-record results and whether the strict pass succeeded.
///
/// The strict pass accepts only integer years. When any value fails it, the
/// lenient pass runs instead: integral decimals such as `2005.0` are accepted
/// and anything still unparseable becomes `None`.
fn coerce_years(years: &[String]) -> (Vec<Option<i32>>, bool) {
    let strict: Option<Vec<i32>> = years.iter().map(|y| parse_year(y)).collect();
    if let Some(all) = strict {
        return (all.into_iter().map(Some).collect(), true);
    }

    debug!("strict year parse failed; coercing per record");
    let lenient = years
        .iter()
        .enumerate()
        .map(|(idx, y)| {
            let parsed = coerce_year(y);
            if parsed.is_none() {
                debug!(index = idx, value = %y, "unparseable year");
            }
            parsed
        })
        .collect();
    (lenient, false)
}

/// Numeric coercion: an integer year, or a decimal with no fractional part.
fn coerce_year(s: &str) -> Option<i32> {
    if let Some(year) = parse_year(s) {
        return Some(year);
    }
    let value = s.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 || !(1000.0..=9999.0).contains(&value) {
        return None;
    }
    Some(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRecord;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| RawRecord::new(r.iter().map(|v| v.to_string()).collect()))
                .collect(),
        )
    }

    fn dated(n: usize) -> RawTable {
        let headers = vec!["Date".to_string(), "Company".to_string()];
        let records = (0..n)
            .map(|i| {
                RawRecord::new(vec![
                    format!("Jan 3, {}", 1988 + i),
                    format!("Company {i}"),
                ])
            })
            .collect();
        RawTable::new(headers, records)
    }

    fn years(n: &Normalized) -> Vec<i32> {
        n.records.iter().map(|r| r.year).collect()
    }

    #[test]
    fn date_column_yields_trailing_year() {
        let t = table(
            &["Date", "Company"],
            &[&["January 3, 1988", "Orion"], &["24 November 2013", "PrimeSense"]],
        );
        let n = normalize(t, &NormalizeConfig::default()).unwrap();
        assert_eq!(n.report.year_source, YearSource::Date);
        assert_eq!(years(&n), vec![1988, 2013]);
        assert!(n.report.strict);
    }

    #[test]
    fn short_tables_are_not_repaired() {
        let n = normalize(dated(11), &NormalizeConfig::default()).unwrap();
        assert!(!n.report.legacy_repaired);
        assert_eq!(years(&n), (1988..1999).collect::<Vec<_>>());
    }

    #[test]
    fn record_eleven_is_forced_to_2000() {
        let n = normalize(dated(12), &NormalizeConfig::default()).unwrap();
        assert!(n.report.legacy_repaired);
        assert_eq!(n.records[11].year, 2000);
        assert_eq!(n.records[10].year, 1998);
    }

    #[test]
    fn repair_applies_even_when_the_value_is_unparseable() {
        let mut t = dated(13);
        t.records[11].fields[0] = "unknown".to_string();
        let n = normalize(t, &NormalizeConfig::default()).unwrap();
        assert_eq!(n.records.len(), 13);
        assert_eq!(n.records[11].year, 2000);
    }

    #[test]
    fn fifteen_record_example() {
        let n = normalize(dated(15), &NormalizeConfig::default()).unwrap();
        assert_eq!(n.records.len(), 15);
        assert_eq!(n.records[11].year, 2000);
        assert_eq!(n.records[0].year, 1988);
        assert_eq!(n.records[14].year, 2002);
    }

    #[test]
    fn legacy_repair_can_be_disabled() {
        let config = NormalizeConfig {
            legacy_repair: false,
            overrides: Vec::new(),
        };
        let n = normalize(dated(15), &config).unwrap();
        assert!(!n.report.legacy_repaired);
        assert_eq!(n.records[11].year, 1999);
    }

    #[test]
    fn lower_year_column_is_taken_verbatim() {
        let t = table(&["year", "Company"], &[&["1997", "NeXT"], &[" 2005 ", "FingerWorks"]]);
        let n = normalize(t, &NormalizeConfig::default()).unwrap();
        assert_eq!(n.report.year_source, YearSource::LowerYear);
        assert_eq!(years(&n), vec![1997, 2005]);
    }

    #[test]
    fn existing_year_column_is_kept() {
        let t = table(&["Company", "Year"], &[&["Siri", "2010"]]);
        let n = normalize(t, &NormalizeConfig::default()).unwrap();
        assert_eq!(n.report.year_source, YearSource::Year);
        assert_eq!(n.records[0].fields, vec!["Siri", "2010"]);
    }

    #[test]
    fn date_wins_over_year_columns() {
        let t = table(&["year", "Date", "Year"], &[&["1990", "May 1, 2014", "1991"]]);
        let n = normalize(t, &NormalizeConfig::default()).unwrap();
        assert_eq!(n.report.year_source, YearSource::Date);
        assert_eq!(n.records[0].year, 2014);
        // The stale `Year` field is rewritten with the derived year.
        assert_eq!(n.records[0].fields[2], "2014");
    }

    #[test]
    fn missing_temporal_column_is_fatal() {
        let t = table(&["Company", "Country"], &[&["Beats", "US"]]);
        let err = normalize(t, &NormalizeConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_SCHEMA);
    }

    #[test]
    fn unparseable_years_are_dropped() {
        let t = table(
            &["Date", "Company"],
            &[
                &["June 2010", "Siri"],
                &["1988[4]", "Styleware"],
                &["", "Unknown"],
                &["July 2014", "BookLamp"],
            ],
        );
        let n = normalize(t, &NormalizeConfig::default()).unwrap();
        assert!(!n.report.strict);
        assert_eq!(n.report.dropped, 2);
        assert_eq!(years(&n), vec![2010, 2014]);
    }

    #[test]
    fn lenient_pass_accepts_integral_decimals() {
        let t = table(&["year"], &[&["2005.0"], &["2005.5"], &["n/a"], &["2014"]]);
        let n = normalize(t, &NormalizeConfig::default()).unwrap();
        assert!(!n.report.strict);
        assert_eq!(n.report.dropped, 2);
        assert_eq!(years(&n), vec![2005, 2014]);
    }

    #[test]
    fn strict_pass_rejects_decimals() {
        assert_eq!(parse_year("2005.0"), None);
        assert_eq!(coerce_year("2005.0"), Some(2005));
        assert_eq!(coerce_year(" 1997 "), Some(1997));
        assert_eq!(coerce_year("NaN"), None);
        assert_eq!(coerce_year("99.0"), None);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let t = table(&["year"], &[&["n/a"], &["?"]]);
        let n = normalize(t, &NormalizeConfig::default()).unwrap();
        assert!(n.records.is_empty());
        assert_eq!(n.report.dropped, 2);
    }

    #[test]
    fn overrides_are_keyed_by_entity() {
        let t = table(
            &["Date", "Company"],
            &[&["??", "NeXT"], &["1999", "SoundJam MP"]],
        );
        let config = NormalizeConfig {
            legacy_repair: true,
            overrides: vec![
                "NeXT=1997".parse().unwrap(),
                "Nobody=1990".parse().unwrap(),
            ],
        };
        let n = normalize(t, &config).unwrap();
        assert_eq!(n.report.overrides_applied, 1);
        assert_eq!(years(&n), vec![1997, 1999]);
    }

    #[test]
    fn last_chars_handles_short_and_multibyte_input() {
        assert_eq!(last_chars("99", 4), "99");
        assert_eq!(last_chars("März 2002", 4), "2002");
    }
}
