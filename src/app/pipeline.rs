//! Shared "load → filter → aggregate" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load default dataset -> optional alternate file -> filter -> metrics/series
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use chrono::NaiveDate;

use crate::analytics::{
    conversion_distribution, cumulative_series, daily_conversion_series, daily_series, filter_by_range, summarize,
    weekday_summary,
};
use crate::domain::{
    ConversionBand, CumulativePoint, DailyConversion, DailyPoint, DashboardConfig, DateRange, MetricsSummary,
    RecordSet, WeekdayRow,
};
use crate::error::AppError;
use crate::io::ingest::{LoadedData, load_records};

/// Everything derived for one date range. Rebuilt on every filter change.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub range: DateRange,
    pub records: RecordSet,
    pub summary: MetricsSummary,
    pub daily: Vec<DailyPoint>,
    pub weekday: Vec<WeekdayRow>,
    pub daily_conversion: Vec<DailyConversion>,
    pub cumulative: Vec<CumulativePoint>,
    pub bands: Vec<ConversionBand>,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Filter `records` to `range` and compute every metric and series.
pub fn compute_view(records: &RecordSet, range: DateRange) -> DashboardView {
    let filtered = filter_by_range(records, &range);
    let summary = summarize(&filtered);
    let daily = daily_series(&filtered);
    let weekday = weekday_summary(&daily);
    let daily_conversion = daily_conversion_series(&daily);
    let cumulative = cumulative_series(&daily);
    let bands = conversion_distribution(&daily_conversion);

    DashboardView {
        range,
        records: filtered,
        summary,
        daily,
        weekday,
        daily_conversion,
        cumulative,
        bands,
    }
}

/// Loaded datasets for a session.
///
/// The default dataset is loaded once and never modified. An alternate
/// ("uploaded") dataset may replace it for display; if loading one fails the
/// default stays active and a notice is kept for the user.
#[derive(Debug, Clone)]
pub struct Dashboard {
    default: LoadedData,
    upload: Option<LoadedData>,
    notice: Option<String>,
}

impl Dashboard {
    /// Load the default dataset (fatal on failure) and the optional alternate one.
    pub fn load(config: &DashboardConfig) -> Result<Self, AppError> {
        let default = load_records(&config.data_path).map_err(|e| {
            AppError::new(
                e.exit_code(),
                format!(
                    "Default data file could not be loaded ({}): {e}",
                    config.data_path.display()
                ),
            )
        })?;

        let mut dashboard = Self::from_default(default);
        if let Some(path) = &config.upload_path {
            dashboard.open_upload(path);
        }
        Ok(dashboard)
    }

    pub fn from_default(default: LoadedData) -> Self {
        Self {
            default,
            upload: None,
            notice: None,
        }
    }

    /// Try to switch to an alternate file; keeps the current data on failure.
    ///
    /// Returns `true` if the alternate file is now active.
    pub fn open_upload(&mut self, path: &Path) -> bool {
        match load_records(path) {
            Ok(data) => {
                self.notice = None;
                self.upload = Some(data);
                true
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "alternate file failed; using default dataset");
                self.notice = Some(format!(
                    "Could not load '{}' ({err}). Showing the default dataset.",
                    path.display()
                ));
                self.upload = None;
                false
            }
        }
    }

    /// Drop the alternate file and go back to the default dataset.
    pub fn reset_to_default(&mut self) {
        self.upload = None;
        self.notice = None;
    }

    /// The dataset currently shown.
    pub fn active(&self) -> &LoadedData {
        self.upload.as_ref().unwrap_or(&self.default)
    }

    pub fn default_data(&self) -> &LoadedData {
        &self.default
    }

    pub fn is_using_upload(&self) -> bool {
        self.upload.is_some()
    }

    /// Notice from the last failed alternate-file load, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// First and last date of the active dataset.
    pub fn full_range(&self) -> Option<DateRange> {
        self.active()
            .records
            .date_bounds()
            .map(|(start, end)| DateRange::new(start, end))
    }

    /// Resolve optional bounds against the active dataset's first/last date.
    ///
    /// With an empty dataset and no explicit bounds, both ends fall back to `today`.
    pub fn resolve_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> DateRange {
        let full = self.full_range();
        let start = start.or(full.map(|r| r.start)).unwrap_or(today);
        let end = end.or(full.map(|r| r.end)).unwrap_or(today);
        DateRange::new(start, end)
    }

    pub fn view(&self, range: DateRange) -> DashboardView {
        compute_view(&self.active().records, range)
    }
}
