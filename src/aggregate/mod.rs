//! Per-year counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{NormalizedRecord, entity_column_index};

/// Acquisitions per year. Iteration is ascending by year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearCount {
    counts: BTreeMap<i32, usize>,
}

impl YearCount {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, usize)>) -> Self {
        let mut counts = BTreeMap::new();
        for (year, count) in pairs {
            *counts.entry(year).or_insert(0) += count;
        }
        Self { counts }
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, usize)> + '_ {
        self.counts.iter().map(|(&y, &c)| (y, c))
    }

    pub fn get(&self, year: i32) -> usize {
        self.counts.get(&year).copied().unwrap_or(0)
    }

    pub fn years(&self) -> Vec<i32> {
        self.counts.keys().copied().collect()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn to_bars(&self) -> Vec<YearBar> {
        self.iter().map(|(year, count)| YearBar { year, count }).collect()
    }
}

/// One `(Year, Count)` pair as handed to presenters and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBar {
    pub year: i32,
    pub count: usize,
}

/// Counts plus the entity names behind them.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub counts: YearCount,
    pub entity_column: Option<String>,
    /// Entity names per year, in input order.
    pub entities: BTreeMap<i32, Vec<String>>,
}

impl Aggregation {
    pub fn entities_in(&self, year: i32) -> &[String] {
        self.entities.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Totals on each side of an era boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraTotals {
    /// Last year of the first era.
    pub split_year: i32,
    /// Records with `year <= split_year`.
    pub before: usize,
    /// Records with `year > split_year`.
    pub after: usize,
    pub years_before: usize,
    pub years_after: usize,
}

impl EraTotals {
    pub fn mean_before(&self) -> f64 {
        mean(self.before, self.years_before)
    }

    pub fn mean_after(&self) -> f64 {
        mean(self.after, self.years_after)
    }
}

fn mean(total: usize, years: usize) -> f64 {
    if years == 0 {
        0.0
    } else {
        total as f64 / years as f64
    }
}

/// Group records by year. Every record counts once, whatever its entity value.
pub fn aggregate(headers: &[String], records: &[NormalizedRecord]) -> Aggregation {
    let entity_idx = entity_column_index(headers);
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    let mut entities: BTreeMap<i32, Vec<String>> = BTreeMap::new();

    for record in records {
        *counts.entry(record.year).or_insert(0) += 1;
        if let Some(name) = entity_idx
            .and_then(|idx| record.fields.get(idx))
            .filter(|v| !v.is_empty())
        {
            entities.entry(record.year).or_default().push(name.clone());
        }
    }

    Aggregation {
        counts: YearCount { counts },
        entity_column: entity_idx.and_then(|idx| headers.get(idx).cloned()),
        entities,
    }
}

pub fn era_totals(counts: &YearCount, split_year: i32) -> EraTotals {
    let mut totals = EraTotals {
        split_year,
        before: 0,
        after: 0,
        years_before: 0,
        years_after: 0,
    };
    for (year, count) in counts.iter() {
        if year > split_year {
            totals.after += count;
            totals.years_after += 1;
        } else {
            totals.before += count;
            totals.years_before += 1;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, company: &str) -> NormalizedRecord {
        NormalizedRecord {
            year,
            fields: vec![format!("{year}"), company.to_string()],
        }
    }

    fn headers() -> Vec<String> {
        vec!["Date".to_string(), "Company".to_string()]
    }

    #[test]
    fn counts_sum_to_input_and_keys_ascend() {
        let records = vec![
            rec(2014, "Beats"),
            rec(1997, "NeXT"),
            rec(2014, "Swell"),
            rec(2010, "Siri"),
            rec(2014, ""),
        ];
        let agg = aggregate(&headers(), &records);
        assert_eq!(agg.counts.total(), records.len());
        let years = agg.counts.years();
        assert!(years.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(agg.counts.get(2014), 3);
        assert_eq!(agg.entities_in(2014), ["Beats", "Swell"]);
        assert_eq!(agg.entity_column.as_deref(), Some("Company"));
    }

    #[test]
    fn empty_input_yields_empty_counts() {
        let agg = aggregate(&headers(), &[]);
        assert!(agg.counts.is_empty());
        assert_eq!(agg.counts.total(), 0);
        assert_eq!(agg.counts.max_count(), 0);
        assert!(agg.entities_in(2000).is_empty());
    }

    #[test]
    fn falls_back_to_first_column_for_entities() {
        let headers = vec!["Target".to_string(), "year".to_string()];
        let records = vec![NormalizedRecord {
            year: 2008,
            fields: vec!["P.A. Semi".to_string(), "2008".to_string()],
        }];
        let agg = aggregate(&headers, &records);
        assert_eq!(agg.entity_column.as_deref(), Some("Target"));
        assert_eq!(agg.entities_in(2008), ["P.A. Semi"]);
    }

    #[test]
    fn era_split_is_inclusive_of_split_year() {
        let counts = YearCount::from_pairs([(2010, 4), (2011, 1), (2012, 3), (2014, 9)]);
        let era = era_totals(&counts, 2011);
        assert_eq!((era.before, era.after), (5, 12));
        assert_eq!((era.years_before, era.years_after), (2, 2));
        assert!((era.mean_after() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn from_pairs_merges_duplicate_years() {
        let counts = YearCount::from_pairs([(2001, 1), (2001, 2)]);
        assert_eq!(counts.to_bars(), vec![YearBar { year: 2001, count: 3 }]);
    }
}
