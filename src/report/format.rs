//! Formatted terminal output: KPIs and tables.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for golden tests)

use crate::app::pipeline::DashboardView;
use crate::domain::{ConversionBand, DailyConversion, DailyPoint, MetricsSummary, WeekdayRow};
use crate::io::ingest::{LoadedData, RowError};

/// How many skipped rows to list individually before summarizing.
const MAX_LISTED_ROW_ERRORS: usize = 5;

/// Format the run header (source + row counts + range) and the KPI block.
pub fn format_run_summary(view: &DashboardView, data: &LoadedData, notice: Option<&str>) -> String {
    let mut out = String::new();

    out.push_str("=== showroom - Customer Walk-in & Test Drive Dashboard ===\n");
    out.push_str(&format!("Source: {}\n", data.source.display()));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        data.rows_read,
        data.rows_used(),
        data.rows_skipped()
    ));
    out.push_str(&format_row_errors(&data.row_errors));
    out.push_str(&format!("Range: {}\n", view.range));
    if let Some(notice) = notice {
        out.push_str(&format!("Notice: {notice}\n"));
    }
    out.push('\n');

    if view.is_empty() {
        out.push_str("No data in the selected date range.\n\n");
    }
    out.push_str(&format_kpis(&view.summary));

    out
}

/// The four headline KPIs.
pub fn format_kpis(summary: &MetricsSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<26}{}\n", "Total Walk-in Customers:", summary.total_walk_ins));
    out.push_str(&format!("{:<26}{}\n", "Total Test Drives:", summary.total_test_drives));
    out.push_str(&format!(
        "{:<26}{}\n",
        "Overall Conversion Rate:",
        fmt_pct(summary.conversion_rate)
    ));
    out.push_str(&format!(
        "{:<26}{:.1}\n",
        "Average Walk-ins per Day:", summary.avg_walk_ins_per_day
    ));
    out
}

/// Per-weekday table (Mon → Sun, missing weekdays omitted).
pub fn format_weekday_table(rows: &[WeekdayRow]) -> String {
    let mut out = String::new();
    out.push_str("Performance by day of week:\n");
    out.push_str(&format!(
        "{:<8} {:>6} {:>10} {:>12} {:>11} {:>13}\n",
        "weekday", "days", "walk_ins", "test_drives", "conversion", "avg_daily_conv"
    ));
    out.push_str(&format!(
        "{:-<8} {:-<6} {:-<10} {:-<12} {:-<11} {:-<13}\n",
        "", "", "", "", "", ""
    ));

    for r in rows {
        out.push_str(&format!(
            "{:<8} {:>6} {:>10} {:>12} {:>11} {:>13}\n",
            r.label(),
            r.days,
            r.walk_ins,
            r.test_drives,
            fmt_pct(r.conversion_rate),
            fmt_pct(r.mean_daily_conversion),
        ));
    }

    out
}

/// Per-date table with the daily conversion rate.
pub fn format_daily_table(daily: &[DailyPoint], conversion: &[DailyConversion]) -> String {
    let mut out = String::new();
    out.push_str("Daily walk-ins and test drives:\n");
    out.push_str(&format!(
        "{:<10} {:<4} {:>10} {:>12} {:>11}\n",
        "date", "day", "walk_ins", "test_drives", "conversion"
    ));
    out.push_str(&format!("{:-<10} {:-<4} {:-<10} {:-<12} {:-<11}\n", "", "", "", "", ""));

    for (p, c) in daily.iter().zip(conversion) {
        out.push_str(&format!(
            "{:<10} {:<4} {:>10} {:>12} {:>11}\n",
            p.date,
            crate::domain::weekday_label(p.weekday()),
            p.walk_ins,
            p.test_drives,
            fmt_pct(c.conversion_rate),
        ));
    }

    out
}

/// Distribution of daily conversion rates.
pub fn format_band_table(bands: &[ConversionBand]) -> String {
    let mut out = String::new();
    out.push_str("Distribution of daily conversion rate:\n");
    for b in bands {
        out.push_str(&format!("{:<8} {:>4} day(s)\n", b.band.label(), b.days));
    }
    out
}

fn format_row_errors(errors: &[RowError]) -> String {
    let mut out = String::new();
    for e in errors.iter().take(MAX_LISTED_ROW_ERRORS) {
        out.push_str(&format!("  skipped line {}: {}\n", e.line, e.message));
    }
    if errors.len() > MAX_LISTED_ROW_ERRORS {
        out.push_str(&format!(
            "  ... and {} more skipped row(s)\n",
            errors.len() - MAX_LISTED_ROW_ERRORS
        ));
    }
    out
}

/// Format a fractional rate as a percentage with one decimal.
pub fn fmt_pct(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::compute_view;
    use crate::domain::{DateRange, Record, RecordSet};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn example() -> (RecordSet, LoadedData) {
        let records = RecordSet::from_unsorted(vec![
            Record::new(d(1), 10, 3),
            Record::new(d(1), 5, 1),
            Record::new(d(2), 0, 0),
        ]);
        let data = LoadedData {
            source: PathBuf::from("sheet.csv"),
            records: records.clone(),
            row_errors: vec![RowError {
                line: 7,
                message: "Invalid date 'x'.".to_string(),
            }],
            rows_read: 4,
        };
        (records, data)
    }

    #[test]
    fn kpi_block_golden() {
        let (records, _) = example();
        let view = compute_view(&records, DateRange::new(d(1), d(2)));
        let expected = concat!(
            "Total Walk-in Customers:  15\n",
            "Total Test Drives:        4\n",
            "Overall Conversion Rate:  26.7%\n",
            "Average Walk-ins per Day: 7.5\n",
        );
        assert_eq!(format_kpis(&view.summary), expected);
    }

    #[test]
    fn run_summary_lists_skipped_rows_and_notice() {
        let (records, data) = example();
        let view = compute_view(&records, DateRange::new(d(1), d(2)));
        let txt = format_run_summary(&view, &data, Some("Could not load 'up.xlsx'."));
        assert!(txt.contains("Rows: read=4 | used=3 | skipped=1\n"));
        assert!(txt.contains("  skipped line 7: Invalid date 'x'.\n"));
        assert!(txt.contains("Range: 2024-01-01 → 2024-01-02\n"));
        assert!(txt.contains("Notice: Could not load 'up.xlsx'.\n"));
        assert!(!txt.contains("No data in the selected date range."));
    }

    #[test]
    fn empty_range_says_so() {
        let (records, data) = example();
        let view = compute_view(&records, DateRange::new(d(2), d(1)));
        let txt = format_run_summary(&view, &data, None);
        assert!(txt.contains("No data in the selected date range."));
        assert!(txt.contains("Overall Conversion Rate:  0.0%"));
    }

    #[test]
    fn weekday_table_rows() {
        let (records, _) = example();
        let view = compute_view(&records, DateRange::new(d(1), d(2)));
        let txt = format_weekday_table(&view.weekday);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("Mon"));
        assert!(lines[3].trim_end().ends_with("26.7%"));
        assert!(lines[4].starts_with("Tue"));
    }

    #[test]
    fn daily_table_has_one_line_per_date() {
        let (records, _) = example();
        let view = compute_view(&records, DateRange::new(d(1), d(2)));
        let txt = format_daily_table(&view.daily, &view.daily_conversion);
        assert_eq!(txt.lines().count(), 5);
        assert!(txt.contains("2024-01-01 Mon"));
    }
}
