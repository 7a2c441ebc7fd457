//! Read/write JSON metrics reports.
//!
//! A report is the "portable" representation of one dashboard view:
//! - provenance (source file, range, skipped rows)
//! - scalar KPIs
//! - every chart series
//!
//! `showroom plot --report` re-renders a saved report without the source sheet.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::pipeline::DashboardView;
use crate::domain::{
    ConversionBand, CumulativePoint, DailyConversion, DailyPoint, DateRange, MetricsSummary, WeekdayRow,
};
use crate::error::AppError;
use crate::io::ingest::LoadedData;

/// Serialized form of a dashboard view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub tool: String,
    pub source: String,
    pub range: DateRange,
    pub rows_skipped: usize,
    pub summary: MetricsSummary,
    pub daily: Vec<DailyPoint>,
    pub weekday: Vec<WeekdayRow>,
    pub daily_conversion: Vec<DailyConversion>,
    pub cumulative: Vec<CumulativePoint>,
    pub conversion_bands: Vec<ConversionBand>,
}

impl DashboardReport {
    pub fn from_view(view: &DashboardView, data: &LoadedData) -> Self {
        Self {
            tool: "showroom".to_string(),
            source: data.source.display().to_string(),
            range: view.range,
            rows_skipped: data.rows_skipped(),
            summary: view.summary,
            daily: view.daily.clone(),
            weekday: view.weekday.clone(),
            daily_conversion: view.daily_conversion.clone(),
            cumulative: view.cumulative.clone(),
            conversion_bands: view.bands.clone(),
        }
    }
}

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &DashboardReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::input(format!("Failed to write report JSON: {e}")))?;

    tracing::info!(path = %path.display(), days = report.daily.len(), "wrote report JSON");
    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<DashboardReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: DashboardReport =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid report JSON: {e}")))?;
    Ok(report)
}
