//! Command-line parsing for the acquisitions dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from fetching, cleaning, and rendering.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::selector::TableRule;
use crate::domain::{DEFAULT_SPLIT_YEAR, YearOverride};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "acq", version, about = "Acquisitions-per-year dashboard (web page with CSV fallback)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the table, print the summary and an ASCII bar chart.
    Show(ShowArgs),
    /// Launch the interactive dashboard.
    Tui(SourceArgs),
    /// Load the table and write year counts to CSV and/or JSON.
    Export(ExportArgs),
    /// Plot a previously exported counts JSON.
    Plot(PlotArgs),
}

/// Where to load the table from and how to clean it.
///
/// Unset options fall back to `ACQ_*` environment variables (a `.env` file is
/// honored), then to built-in defaults.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Page holding the acquisitions table [env: ACQ_SOURCE_URL].
    #[arg(long)]
    pub url: Option<String>,

    /// Table rule: class:<name>, index:<n>, or header:<text> [default: class:wikitable].
    #[arg(long, value_name = "RULE")]
    pub table: Option<TableRule>,

    /// Local fallback CSV [env: ACQ_DATA_CSV] [default: data.csv].
    #[arg(long = "csv-path", value_name = "CSV")]
    pub csv_path: Option<PathBuf>,

    /// HTTP timeout in seconds [env: ACQ_TIMEOUT_SECS] [default: 10].
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// User-Agent header for the page request [env: ACQ_USER_AGENT].
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Skip the web page and read the local CSV only.
    #[arg(long)]
    pub offline: bool,

    /// Do not force record #11 to year 2000.
    #[arg(long)]
    pub no_legacy_repair: bool,

    /// Correct one entity's year (repeatable).
    #[arg(long = "override", value_name = "ENTITY=YEAR")]
    pub overrides: Vec<YearOverride>,

    /// Last year of the first era; later bars are highlighted.
    #[arg(long, default_value_t = DEFAULT_SPLIT_YEAR)]
    pub split_year: i32,
}

/// Options for `acq show`.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Skip the bar chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Also print the per-year table with acquired names.
    #[arg(long)]
    pub table_view: bool,

    /// Chart height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,

    /// Columns per bar.
    #[arg(long, default_value_t = 4)]
    pub bar_width: usize,
}

/// Options for `acq export`.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write `year,count,era` rows here.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Write the counts JSON (readable by `acq plot`) here.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

/// Options for plotting a saved counts file.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Counts JSON produced by `acq export --json`.
    #[arg(long, value_name = "JSON")]
    pub counts: PathBuf,

    /// Chart height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,

    /// Columns per bar.
    #[arg(long, default_value_t = 4)]
    pub bar_width: usize,
}
