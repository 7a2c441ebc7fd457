//! Command-line parsing for the showroom dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loading/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "showroom",
    version,
    about = "Customer walk-in & test drive dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print KPIs, weekday and conversion tables, and an ASCII trend plot.
    Summary(SummaryArgs),
    /// Write the filtered table to CSV (the dashboard's "download" button).
    Export(ExportArgs),
    /// Plot a previously exported JSON report.
    Plot(PlotArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same pipeline as `showroom summary`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(SourceArgs),
}

/// Where the data comes from and which dates to keep.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Default data file (.xlsx/.xls/.ods/.csv). Failing to load it is fatal.
    ///
    /// Falls back to `SHOWROOM_DATA_PATH`, then `data/Book Dashboard.xlsx`.
    #[arg(short = 'd', long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Alternate data file of the same shape; on failure the default file is used.
    #[arg(short = 'u', long, value_name = "FILE")]
    pub upload: Option<PathBuf>,

    /// First date to include (YYYY-MM-DD). Defaults to the first date in the data.
    #[arg(long, value_parser = parse_cli_date)]
    pub from: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD). Defaults to the last date in the data.
    #[arg(long, value_parser = parse_cli_date)]
    pub to: Option<NaiveDate>,

    /// Write logs to this file (the TUI logs nowhere otherwise).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Options for the printed summary.
#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Also export the filtered table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export KPIs and all series to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for the CSV export.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV", default_value = crate::io::DEFAULT_EXPORT_NAME)]
    pub out: PathBuf,
}

/// Options for plotting a saved report.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Report JSON produced by `showroom summary --export-json`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_flags_parse() {
        let cli = Cli::parse_from([
            "showroom",
            "summary",
            "-d",
            "sheet.csv",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "--no-plot",
        ]);
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(args.source.data, Some(PathBuf::from("sheet.csv")));
        assert_eq!(args.source.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.source.to, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert!(args.no_plot);
        assert_eq!(args.width, 80);
    }

    #[test]
    fn export_defaults_output_name() {
        let cli = Cli::parse_from(["showroom", "export"]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.out, PathBuf::from("filtered_customer_data.csv"));
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["showroom", "summary", "--from", "01/02/2024"]).is_err());
    }
}
