//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - loaded rows and their ordered container (`Record`, `RecordSet`)
//! - the inclusive filter window (`DateRange`)
//! - derived metrics (`MetricsSummary`, `DailyPoint`, `WeekdayRow`, etc.)
//! - the resolved run configuration (`DashboardConfig`)

pub mod types;

pub use types::*;
