//! KPI and series aggregation.
//!
//! Every rate in this module is a fraction (0.25 = 25%) and goes through
//! [`safe_divide`], so empty inputs and zero-walk-in days produce `0.0`
//! rather than NaN/inf.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Weekday;

use crate::domain::{
    ConversionBand, ConversionBandKind, CumulativePoint, DailyConversion, DailyPoint, MetricsSummary, RecordSet,
    WeekdayRow,
};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// `numerator / denominator`, or `0.0` when the denominator is zero.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Conversion rate for a pair of counts.
pub fn conversion_rate(test_drives: u64, walk_ins: u64) -> f64 {
    safe_divide(test_drives as f64, walk_ins as f64)
}

/// Scalar KPIs for a record set.
pub fn summarize(records: &RecordSet) -> MetricsSummary {
    let mut total_walk_ins = 0u64;
    let mut total_test_drives = 0u64;
    let mut days = HashSet::new();

    for r in records {
        total_walk_ins += u64::from(r.walk_ins);
        total_test_drives += u64::from(r.test_drives);
        days.insert(r.date);
    }

    let distinct_days = days.len();
    MetricsSummary {
        total_walk_ins,
        total_test_drives,
        conversion_rate: conversion_rate(total_test_drives, total_walk_ins),
        avg_walk_ins_per_day: safe_divide(total_walk_ins as f64, distinct_days as f64),
        distinct_days,
    }
}

/// One entry per distinct date (ascending), with duplicate dates summed.
pub fn daily_series(records: &RecordSet) -> Vec<DailyPoint> {
    let mut by_date: BTreeMap<_, (u64, u64)> = BTreeMap::new();
    for r in records {
        let entry = by_date.entry(r.date).or_default();
        entry.0 += u64::from(r.walk_ins);
        entry.1 += u64::from(r.test_drives);
    }

    by_date
        .into_iter()
        .map(|(date, (walk_ins, test_drives))| DailyPoint {
            date,
            walk_ins,
            test_drives,
        })
        .collect()
}

/// Conversion rate per daily entry.
pub fn daily_conversion_series(daily: &[DailyPoint]) -> Vec<DailyConversion> {
    daily
        .iter()
        .map(|p| DailyConversion {
            date: p.date,
            conversion_rate: conversion_rate(p.test_drives, p.walk_ins),
        })
        .collect()
}

/// Per-weekday totals over the daily series, Monday first.
///
/// Weekdays without any dates are omitted.
pub fn weekday_summary(daily: &[DailyPoint]) -> Vec<WeekdayRow> {
    #[derive(Default)]
    struct Acc {
        walk_ins: u64,
        test_drives: u64,
        days: usize,
        rate_sum: f64,
    }

    let mut groups: HashMap<Weekday, Acc> = HashMap::new();
    for p in daily {
        let acc = groups.entry(p.weekday()).or_default();
        acc.walk_ins += p.walk_ins;
        acc.test_drives += p.test_drives;
        acc.days += 1;
        acc.rate_sum += conversion_rate(p.test_drives, p.walk_ins);
    }

    WEEK.iter()
        .filter_map(|day| {
            let acc = groups.get(day)?;
            Some(WeekdayRow {
                weekday: *day,
                walk_ins: acc.walk_ins,
                test_drives: acc.test_drives,
                conversion_rate: conversion_rate(acc.test_drives, acc.walk_ins),
                days: acc.days,
                mean_daily_conversion: safe_divide(acc.rate_sum, acc.days as f64),
            })
        })
        .collect()
}

/// Running totals over the daily series.
pub fn cumulative_series(daily: &[DailyPoint]) -> Vec<CumulativePoint> {
    let mut walk_ins = 0u64;
    let mut test_drives = 0u64;
    daily
        .iter()
        .map(|p| {
            walk_ins += p.walk_ins;
            test_drives += p.test_drives;
            CumulativePoint {
                date: p.date,
                walk_ins,
                test_drives,
            }
        })
        .collect()
}

/// Count of days per conversion band. All bands are always present, in order.
pub fn conversion_distribution(daily: &[DailyConversion]) -> Vec<ConversionBand> {
    let mut counts: HashMap<ConversionBandKind, usize> = HashMap::new();
    for p in daily {
        *counts.entry(ConversionBandKind::classify(p.conversion_rate)).or_default() += 1;
    }

    ConversionBandKind::ALL
        .iter()
        .map(|&band| ConversionBand {
            band,
            days: counts.get(&band).copied().unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn example_set() -> RecordSet {
        RecordSet::from_unsorted(vec![
            Record::new(d(2024, 1, 1), 10, 3),
            Record::new(d(2024, 1, 1), 5, 1),
            Record::new(d(2024, 1, 2), 0, 0),
        ])
    }

    #[test]
    fn safe_divide_guards_zero() {
        assert_eq!(safe_divide(4.0, 0.0), 0.0);
        assert_eq!(safe_divide(0.0, 0.0), 0.0);
        assert!((safe_divide(1.0, 4.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn duplicate_dates_merge_in_daily_series() {
        let daily = daily_series(&example_set());
        assert_eq!(
            daily,
            vec![
                DailyPoint { date: d(2024, 1, 1), walk_ins: 15, test_drives: 4 },
                DailyPoint { date: d(2024, 1, 2), walk_ins: 0, test_drives: 0 },
            ]
        );
    }

    #[test]
    fn summary_matches_worked_example() {
        let s = summarize(&example_set());
        assert_eq!(s.total_walk_ins, 15);
        assert_eq!(s.total_test_drives, 4);
        assert!((s.conversion_rate - 4.0 / 15.0).abs() < 1e-12);
        assert!((s.avg_walk_ins_per_day - 7.5).abs() < 1e-12);
        assert_eq!(s.distinct_days, 2);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let empty = RecordSet::default();
        let s = summarize(&empty);
        assert_eq!(s, MetricsSummary::default());

        let daily = daily_series(&empty);
        assert!(daily.is_empty());
        assert!(weekday_summary(&daily).is_empty());
        assert!(daily_conversion_series(&daily).is_empty());
        assert!(cumulative_series(&daily).is_empty());

        let bands = conversion_distribution(&[]);
        assert_eq!(bands.len(), 6);
        assert!(bands.iter().all(|b| b.days == 0));
    }

    #[test]
    fn daily_series_preserves_totals() {
        let set = RecordSet::from_unsorted(vec![
            Record::new(d(2024, 3, 4), 7, 2),
            Record::new(d(2024, 3, 1), 3, 3),
            Record::new(d(2024, 3, 4), 9, 1),
            Record::new(d(2024, 3, 2), 0, 0),
            Record::new(d(2024, 3, 1), 11, 4),
        ]);
        let daily = daily_series(&set);
        let total: u64 = daily.iter().map(|p| p.walk_ins).sum();
        let raw: u64 = set.iter().map(|r| u64::from(r.walk_ins)).sum();
        assert_eq!(total, raw);
        assert_eq!(daily.len(), 3);
        assert!(daily.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn daily_conversion_uses_zero_guard() {
        let daily = daily_series(&example_set());
        let conv = daily_conversion_series(&daily);
        assert!((conv[0].conversion_rate - 4.0 / 15.0).abs() < 1e-12);
        assert_eq!(conv[1].conversion_rate, 0.0);
        assert!(conv.iter().all(|c| c.conversion_rate.is_finite()));
    }

    #[test]
    fn weekday_summary_groups_and_omits_missing_days() {
        // 2024-01-01 and 2024-01-08 are Mondays, 2024-01-03 is a Wednesday.
        let set = RecordSet::from_unsorted(vec![
            Record::new(d(2024, 1, 1), 10, 5),
            Record::new(d(2024, 1, 8), 10, 1),
            Record::new(d(2024, 1, 3), 4, 0),
            Record::new(d(2024, 1, 3), 0, 0),
        ]);
        let rows = weekday_summary(&daily_series(&set));
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].weekday, Weekday::Mon);
        assert_eq!(rows[0].label(), "Mon");
        assert_eq!(rows[0].walk_ins, 20);
        assert_eq!(rows[0].test_drives, 6);
        assert_eq!(rows[0].days, 2);
        assert!((rows[0].conversion_rate - 0.3).abs() < 1e-12);
        // mean of 0.5 and 0.1
        assert!((rows[0].mean_daily_conversion - 0.3).abs() < 1e-12);

        assert_eq!(rows[1].weekday, Weekday::Wed);
        assert_eq!(rows[1].days, 1);
        assert_eq!(rows[1].conversion_rate, 0.0);
    }

    #[test]
    fn cumulative_series_runs_totals() {
        let daily = daily_series(&example_set());
        let cum = cumulative_series(&daily);
        assert_eq!(cum.last().map(|c| (c.walk_ins, c.test_drives)), Some((15, 4)));
        assert_eq!(cum.len(), daily.len());
    }

    #[test]
    fn distribution_counts_each_day_once() {
        let set = RecordSet::from_unsorted(vec![
            Record::new(d(2024, 1, 1), 10, 0),
            Record::new(d(2024, 1, 2), 10, 1),
            Record::new(d(2024, 1, 3), 10, 5),
            Record::new(d(2024, 1, 4), 2, 3),
        ]);
        let conv = daily_conversion_series(&daily_series(&set));
        let bands = conversion_distribution(&conv);
        let counts: Vec<usize> = bands.iter().map(|b| b.days).collect();
        assert_eq!(counts, vec![1, 1, 0, 0, 0, 2]);
    }

    #[test]
    fn more_test_drives_than_walk_ins_is_preserved() {
        let set = RecordSet::from_unsorted(vec![Record::new(d(2024, 1, 1), 2, 3)]);
        let s = summarize(&set);
        assert!((s.conversion_rate - 1.5).abs() < 1e-12);
    }
}
