//! `showroom-dashboard` library crate.
//!
//! Loads daily walk-in/test-drive counts from a workbook or CSV, filters them
//! by date, and derives KPIs, weekday, conversion and cumulative series.
//!
//! The binary (`showroom`) is a thin wrapper around this library so that the
//! loading and aggregation code is testable without spawning processes or
//! touching a terminal.

pub mod analytics;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
