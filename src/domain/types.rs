//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while filtering and aggregating
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One spreadsheet row: a day's walk-ins and test drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub walk_ins: u32,
    /// Expected to be `<= walk_ins`, but never corrected if it isn't.
    pub test_drives: u32,
}

impl Record {
    pub fn new(date: NaiveDate, walk_ins: u32, test_drives: u32) -> Self {
        Self {
            date,
            walk_ins,
            test_drives,
        }
    }
}

/// Records ordered by date (ascending).
///
/// Dates may repeat and need not be contiguous. Rows sharing a date keep their
/// source order. There are no mutating accessors: filtering produces a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Build a set from rows in any order.
    pub fn from_unsorted(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    /// Wrap rows that are already sorted by date, e.g. a subsequence of another set.
    pub(crate) fn from_sorted(records: Vec<Record>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].date <= w[1].date));
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest date present, if any.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.date, last.date))
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Inclusive date window.
///
/// A range with `start > end` is allowed and selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Scalar KPIs over a record set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_walk_ins: u64,
    pub total_test_drives: u64,
    /// `total_test_drives / total_walk_ins`, or 0 when there were no walk-ins.
    pub conversion_rate: f64,
    /// `total_walk_ins / distinct_days`, or 0 when there are no days.
    pub avg_walk_ins_per_day: f64,
    pub distinct_days: usize,
}

/// Per-date totals after merging duplicate dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub walk_ins: u64,
    pub test_drives: u64,
}

impl DailyPoint {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// Conversion rate for a single date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyConversion {
    pub date: NaiveDate,
    pub conversion_rate: f64,
}

/// Aggregates for one weekday across the whole filtered range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekdayRow {
    pub weekday: Weekday,
    pub walk_ins: u64,
    pub test_drives: u64,
    /// Ratio of the summed counts.
    pub conversion_rate: f64,
    /// Number of distinct dates that fell on this weekday.
    pub days: usize,
    /// Mean of the per-day conversion rates.
    pub mean_daily_conversion: f64,
}

impl WeekdayRow {
    pub fn label(&self) -> &'static str {
        weekday_label(self.weekday)
    }
}

/// Short weekday label used in tables and charts.
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Running totals up to and including `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub walk_ins: u64,
    pub test_drives: u64,
}

/// Buckets for the distribution of daily conversion rates.
///
/// Bounds are in percent and upper-inclusive: `(0, 10]`, `(10, 20]`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionBandKind {
    Zero,
    UpTo10,
    UpTo20,
    UpTo30,
    UpTo40,
    Above40,
}

impl ConversionBandKind {
    pub const ALL: [ConversionBandKind; 6] = [
        ConversionBandKind::Zero,
        ConversionBandKind::UpTo10,
        ConversionBandKind::UpTo20,
        ConversionBandKind::UpTo30,
        ConversionBandKind::UpTo40,
        ConversionBandKind::Above40,
    ];

    /// Classify a conversion rate given as a fraction (0.25 = 25%).
    ///
    /// Bands are upper-inclusive. The top band is open-ended, so days with more
    /// test drives than walk-ins (rates above 100%) are still counted there.
    ///
    /// Thresholds are compared as fractions; scaling to percent first would
    /// push exact boundaries such as 0.4 into the next band.
    pub fn classify(rate: f64) -> Self {
        if rate <= 0.0 {
            ConversionBandKind::Zero
        } else if rate <= 0.1 {
            ConversionBandKind::UpTo10
        } else if rate <= 0.2 {
            ConversionBandKind::UpTo20
        } else if rate <= 0.3 {
            ConversionBandKind::UpTo30
        } else if rate <= 0.4 {
            ConversionBandKind::UpTo40
        } else {
            ConversionBandKind::Above40
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConversionBandKind::Zero => "0%",
            ConversionBandKind::UpTo10 => "0–10%",
            ConversionBandKind::UpTo20 => "10–20%",
            ConversionBandKind::UpTo30 => "20–30%",
            ConversionBandKind::UpTo40 => "30–40%",
            ConversionBandKind::Above40 => "40%+",
        }
    }
}

/// Number of days whose conversion rate fell into `band`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionBand {
    pub band: ConversionBandKind,
    pub days: usize,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, environment, and defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Default dataset; failing to load it is fatal.
    pub data_path: PathBuf,
    /// Alternate ("uploaded") dataset; failing to load it falls back to the default.
    pub upload_path: Option<PathBuf>,

    /// Filter bounds. `None` means "use the dataset's first/last date".
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
