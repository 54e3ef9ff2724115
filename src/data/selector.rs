//! Table selection strategies.
//!
//! A page usually carries several tables (navigation boxes, legends, the data
//! itself). The fetcher parses all of them and asks a `TableSelector` which one
//! holds the acquisitions. Keeping this behind a trait lets callers swap the
//! rule without touching parsing or normalization.

use std::fmt;
use std::str::FromStr;

use crate::data::html::HtmlTable;

/// Chooses one table out of every table parsed from a page.
pub trait TableSelector {
    /// Human-readable rule, used in failure messages.
    fn describe(&self) -> String;

    /// Return the selected table, or a cause explaining why none matched.
    fn select<'t>(&self, tables: &'t [HtmlTable]) -> Result<&'t HtmlTable, String>;
}

/// Built-in rules, parseable from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRule {
    /// First table whose `class` attribute contains this class.
    Class(String),
    /// Table at this position in document order (0-based).
    Index(usize),
    /// First table with a header cell containing this text (case-insensitive).
    Header(String),
}

impl Default for TableRule {
    fn default() -> Self {
        TableRule::Class("wikitable".to_string())
    }
}

impl fmt::Display for TableRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRule::Class(c) => write!(f, "class:{c}"),
            TableRule::Index(i) => write!(f, "index:{i}"),
            TableRule::Header(h) => write!(f, "header:{h}"),
        }
    }
}

impl FromStr for TableRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid table rule '{s}'. Expected class:<name>, index:<n>, or header:<text>."))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("Invalid table rule '{s}': empty value."));
        }
        match kind.trim().to_ascii_lowercase().as_str() {
            "class" => Ok(TableRule::Class(value.to_string())),
            "index" => value
                .parse::<usize>()
                .map(TableRule::Index)
                .map_err(|e| format!("Invalid table index '{value}': {e}")),
            "header" => Ok(TableRule::Header(value.to_string())),
            other => Err(format!("Unknown table rule kind '{other}'.")),
        }
    }
}

impl TableSelector for TableRule {
    fn describe(&self) -> String {
        self.to_string()
    }

    fn select<'t>(&self, tables: &'t [HtmlTable]) -> Result<&'t HtmlTable, String> {
        if tables.is_empty() {
            return Err("page contains no tables".to_string());
        }
        match self {
            TableRule::Class(class) => tables
                .iter()
                .find(|t| t.has_class(class))
                .ok_or_else(|| format!("no table with class '{class}' among {} table(s)", tables.len())),
            TableRule::Index(idx) => tables.get(*idx).ok_or_else(|| {
                format!("table index {idx} out of range ({} table(s) on page)", tables.len())
            }),
            TableRule::Header(text) => {
                let needle = text.to_lowercase();
                tables
                    .iter()
                    .find(|t| t.table.headers.iter().any(|h| h.to_lowercase().contains(&needle)))
                    .ok_or_else(|| format!("no table with a header containing '{text}'"))
            }
        }
    }
}

/// Ad-hoc rule from a predicate: the first table it accepts wins.
pub struct Predicate<F> {
    name: String,
    accept: F,
}

impl<F> Predicate<F>
where
    F: Fn(&HtmlTable) -> bool,
{
    pub fn new(name: impl Into<String>, accept: F) -> Self {
        Self {
            name: name.into(),
            accept,
        }
    }
}

impl<F> TableSelector for Predicate<F>
where
    F: Fn(&HtmlTable) -> bool,
{
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn select<'t>(&self, tables: &'t [HtmlTable]) -> Result<&'t HtmlTable, String> {
        tables
            .iter()
            .find(|t| (self.accept)(t))
            .ok_or_else(|| format!("no table matched rule '{}'", self.name))
    }
}
