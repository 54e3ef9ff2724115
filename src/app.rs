//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - resolves configuration (flags, then `ACQ_*` environment, then defaults)
//! - dispatches to the text, export, plot, or TUI front-end

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ExportArgs, PlotArgs, ShowArgs, SourceArgs};
use crate::domain::{DashboardConfig, NormalizeConfig, WebSourceConfig};
use crate::error::AppError;

pub mod pipeline;

pub const ENV_SOURCE_URL: &str = "ACQ_SOURCE_URL";
pub const ENV_DATA_CSV: &str = "ACQ_DATA_CSV";
pub const ENV_TIMEOUT_SECS: &str = "ACQ_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "ACQ_USER_AGENT";

/// Entry point for the `acq` binary.
pub fn run() -> Result<(), AppError> {
    // `acq` and `acq --offline` behave like `acq tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(matches!(cli.command, Command::Tui(_)));

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Tui(args) => handle_tui(args),
        Command::Export(args) => handle_export(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins when set.
///
/// The TUI owns the terminal, so it logs nothing unless asked to; source
/// failures are shown in its sidebar instead.
fn init_logging(tui: bool) {
    let default = if tui { "off" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.source)?;
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run_summary(&run));

    if args.table_view {
        println!("{}", crate::report::format_year_table(&run.aggregation, 3));
    }

    if !args.no_plot {
        let chart = crate::plot::render_bar_chart(&run.bars(), config.split_year, args.height, args.bar_width);
        println!("{chart}");
    }

    Ok(())
}

fn handle_tui(args: SourceArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args)?;
    crate::tui::run(config)
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.csv.is_none() && args.json.is_none() {
        return Err(AppError::config("Nothing to export: pass --csv and/or --json"));
    }

    let config = dashboard_config_from_args(&args.source)?;
    let run = pipeline::run_pipeline(&config)?;

    if let Some(path) = &args.csv {
        crate::io::write_counts_csv(path, &run.aggregation.counts, config.split_year)?;
        info!(path = %path.display(), "wrote counts CSV");
    }
    if let Some(path) = &args.json {
        crate::io::write_counts_json(path, &crate::io::CountsFile::from_run(&run))?;
        info!(path = %path.display(), "wrote counts JSON");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let counts = crate::io::read_counts_json(&args.counts)?;
    let bars = counts.year_count().to_bars();
    let chart = crate::plot::render_bar_chart(&bars, counts.split_year, args.height, args.bar_width);
    println!("{chart}");
    Ok(())
}

/// Resolve the dashboard configuration from flags and the process environment.
///
/// A `.env` file in the working directory is loaded first, if present.
pub fn dashboard_config_from_args(args: &SourceArgs) -> Result<DashboardConfig, AppError> {
    dotenvy::dotenv().ok();
    resolve_config(args, |key| std::env::var(key).ok())
}

/// Flags override `env`, which overrides built-in defaults.
fn resolve_config(args: &SourceArgs, env: impl Fn(&str) -> Option<String>) -> Result<DashboardConfig, AppError> {
    let defaults = DashboardConfig::default();
    let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let url = args.url.clone().or_else(|| env(ENV_SOURCE_URL)).unwrap_or(defaults.web.url);
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::config(format!("Source URL must be http(s): '{url}'")));
    }

    let timeout_secs = match args.timeout {
        Some(secs) => secs,
        None => match env(ENV_TIMEOUT_SECS) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| AppError::config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'")))?,
            None => defaults.web.timeout.as_secs(),
        },
    };
    if timeout_secs == 0 {
        return Err(AppError::config("Timeout must be at least 1 second"));
    }

    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| env(ENV_USER_AGENT))
        .unwrap_or(defaults.web.user_agent);

    let fallback_csv = args
        .csv_path
        .clone()
        .or_else(|| env(ENV_DATA_CSV).map(PathBuf::from))
        .unwrap_or(defaults.fallback_csv);

    Ok(DashboardConfig {
        web: WebSourceConfig {
            url,
            table: args.table.clone().unwrap_or(defaults.web.table),
            user_agent,
            timeout: Duration::from_secs(timeout_secs),
        },
        offline: args.offline,
        fallback_csv,
        normalize: NormalizeConfig {
            legacy_repair: !args.no_legacy_repair,
            overrides: args.overrides.clone(),
        },
        split_year: args.split_year,
    })
}

/// Rewrite argv so `acq` defaults to `acq tui`.
///
/// Rules:
/// - `acq`                       -> `acq tui`
/// - `acq --offline ...`         -> `acq tui --offline ...`
/// - `acq --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "tui" | "export" | "plot");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::cli::Cli;
    use crate::data::selector::TableRule;
    use crate::domain::{DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_SECS};
    use crate::error::EXIT_CONFIG;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn source_args(extra: &[&str]) -> SourceArgs {
        let mut full = vec!["acq", "tui"];
        full.extend_from_slice(extra);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Tui(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["acq"])), argv(&["acq", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["acq", "--offline"])),
            argv(&["acq", "tui", "--offline"])
        );
        assert_eq!(rewrite_args(argv(&["acq", "show"])), argv(&["acq", "show"]));
        assert_eq!(rewrite_args(argv(&["acq", "--help"])), argv(&["acq", "--help"]));
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        let cfg = resolve_config(&source_args(&[]), env_of(&[])).unwrap();
        assert_eq!(cfg.web.url, DEFAULT_SOURCE_URL);
        assert_eq!(cfg.web.table, TableRule::default());
        assert_eq!(cfg.web.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(cfg.fallback_csv, PathBuf::from("data.csv"));
        assert!(cfg.normalize.legacy_repair);
        assert!(!cfg.offline);
    }

    #[test]
    fn env_fills_gaps_and_flags_win() {
        let env = env_of(&[
            (ENV_SOURCE_URL, "https://example.org/list"),
            (ENV_DATA_CSV, "/tmp/acq.csv"),
            (ENV_TIMEOUT_SECS, "30"),
        ]);
        let cfg = resolve_config(&source_args(&["--timeout", "5", "--no-legacy-repair"]), env).unwrap();
        assert_eq!(cfg.web.url, "https://example.org/list");
        assert_eq!(cfg.fallback_csv, PathBuf::from("/tmp/acq.csv"));
        assert_eq!(cfg.web.timeout, Duration::from_secs(5));
        assert!(!cfg.normalize.legacy_repair);
    }

    #[test]
    fn bad_env_values_are_config_errors() {
        let err = resolve_config(&source_args(&[]), env_of(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);

        let err = resolve_config(&source_args(&["--url", "ftp://example.org"]), env_of(&[])).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);

        let err = resolve_config(&source_args(&["--timeout", "0"]), env_of(&[])).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }
}
