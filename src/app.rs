//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the default (and optional alternate) dataset
//! - filters by date and computes KPIs/series
//! - prints reports/plots or launches the TUI
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ExportArgs, PlotArgs, SourceArgs, SummaryArgs};
use crate::domain::DashboardConfig;
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod pipeline;

use pipeline::Dashboard;

/// Entry point for the `showroom` binary.
pub fn run() -> Result<(), AppError> {
    // `showroom` and `showroom -d FILE` behave like `showroom tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // `.env` may carry `RUST_LOG`, so load it before installing the subscriber.
    let dotenv = crate::config::load_dotenv();

    let target = match &cli.command {
        Command::Summary(args) => log_target(&args.source, LogTarget::Stderr),
        Command::Export(args) => log_target(&args.source, LogTarget::Stderr),
        Command::Plot(_) => LogTarget::Stderr,
        Command::Tui(args) => log_target(args, LogTarget::Off),
    };
    crate::logging::init(target)?;
    if let Some(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    match cli.command {
        Command::Summary(args) => handle_summary(args),
        Command::Export(args) => handle_export(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn log_target<'a>(source: &'a SourceArgs, fallback: LogTarget<'a>) -> LogTarget<'a> {
    match &source.log_file {
        Some(path) => LogTarget::File(path),
        None => fallback,
    }
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.source);
    let config = DashboardConfig {
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
        ..config
    };

    let dashboard = Dashboard::load(&config)?;
    let range = dashboard.resolve_range(config.range_start, config.range_end, today());
    let view = dashboard.view(range);
    let data = dashboard.active();

    println!(
        "{}",
        crate::report::format_run_summary(&view, data, dashboard.notice())
    );

    if !view.is_empty() {
        println!("{}", crate::report::format_weekday_table(&view.weekday));
        println!("{}", crate::plot::render_weekday_bars(&view.weekday, 40));
        println!("{}", crate::report::format_band_table(&view.bands));
        println!(
            "{}",
            crate::report::format_daily_table(&view.daily, &view.daily_conversion)
        );
    }

    if config.plot {
        println!(
            "{}",
            crate::plot::render_daily_plot(&view.daily, config.plot_width, config.plot_height)
        );
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_filtered_csv(path, &view.records)?;
    }
    if let Some(path) = &config.export_json {
        let report = crate::io::report::DashboardReport::from_view(&view, data);
        crate::io::report::write_report_json(path, &report)?;
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.source);
    let dashboard = Dashboard::load(&config)?;
    if let Some(notice) = dashboard.notice() {
        eprintln!("{notice}");
    }

    let range = dashboard.resolve_range(config.range_start, config.range_end, today());
    let view = dashboard.view(range);
    crate::io::export::write_filtered_csv(&args.out, &view.records)?;

    println!(
        "Exported {} row(s) ({}) to {}",
        view.records.len(),
        range,
        args.out.display()
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let report = crate::io::report::read_report_json(&args.report)?;
    let plot = crate::plot::render_report_plot(&report, args.width, args.height);

    println!("{plot}");
    Ok(())
}

fn handle_tui(args: SourceArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args);
    let dashboard = Dashboard::load(&config)?;
    let range = dashboard.resolve_range(config.range_start, config.range_end, today());
    crate::tui::run(dashboard, range)
}

/// Build the shared part of the config; command-specific fields keep their defaults.
pub fn dashboard_config_from_args(args: &SourceArgs) -> DashboardConfig {
    DashboardConfig {
        data_path: crate::config::resolve_data_path(args.data.as_deref()),
        upload_path: args.upload.clone(),
        range_start: args.from,
        range_end: args.to,
        plot: true,
        plot_width: 80,
        plot_height: 20,
        export_csv: None,
        export_json: None,
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Rewrite argv so `showroom` defaults to `showroom tui`.
///
/// Rules:
/// - `showroom`                      -> `showroom tui`
/// - `showroom -d FILE ...`          -> `showroom tui -d FILE ...`
/// - `showroom --help/--version/-h`  -> unchanged (show top-level help/version)
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

    let is_subcommand = matches!(arg1.as_str(), "summary" | "export" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
