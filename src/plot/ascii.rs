//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - walk-ins per day: `-` line
//! - test drives per day: `o`
//! - weekday bars: `=` test drives over `#` walk-ins

use crate::domain::{DailyPoint, WeekdayRow};
use crate::io::report::DashboardReport;

/// Render the daily walk-in/test-drive trend.
///
/// The x axis is calendar days from the first to the last date, so gaps in
/// the data show up as gaps in the `o` points.
pub fn render_daily_plot(daily: &[DailyPoint], width: usize, height: usize) -> String {
    let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
        return "Plot: no data in the selected date range.\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);

    let t_max = ((last.date - first.date).num_days() as f64).max(1.0);
    let y_max = daily
        .iter()
        .map(|p| p.walk_ins.max(p.test_drives))
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let mut grid = vec![vec![' '; width]; height];

    // Walk-ins first (so test-drive points can overlay).
    let walk_ins: Vec<(f64, f64)> = daily
        .iter()
        .map(|p| ((p.date - first.date).num_days() as f64, p.walk_ins as f64))
        .collect();
    draw_series_line(&mut grid, &walk_ins, t_max, y_max);

    for p in daily {
        let x = map_x((p.date - first.date).num_days() as f64, t_max, width);
        let y = map_y(p.test_drives as f64, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: date=[{}, {}] | count=[0, {}] | -: walk-ins, o: test drives\n",
        first.date, last.date, y_max as u64
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Render the daily plot stored in a saved report.
pub fn render_report_plot(report: &DashboardReport, width: usize, height: usize) -> String {
    let mut out = format!("Report: {} ({})\n", report.source, report.range);
    out.push_str(&render_daily_plot(&report.daily, width, height));
    out
}

/// Horizontal bars per weekday, scaled to the busiest weekday.
pub fn render_weekday_bars(rows: &[WeekdayRow], width: usize) -> String {
    let width = width.max(5);
    let max = rows
        .iter()
        .map(|r| r.walk_ins.max(r.test_drives))
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let mut out = String::new();
    for r in rows {
        let walk_len = scale(r.walk_ins as f64, max, width);
        let drive_len = scale(r.test_drives as f64, max, width);

        let bar: String = (0..width)
            .map(|i| {
                if i < drive_len {
                    '='
                } else if i < walk_len {
                    '#'
                } else {
                    ' '
                }
            })
            .collect();

        out.push_str(&format!(
            "{:<3} |{bar}| {} / {}\n",
            r.label(),
            r.walk_ins,
            r.test_drives
        ));
    }
    out
}

fn scale(v: f64, max: f64, width: usize) -> usize {
    ((v / max) * width as f64).round() as usize
}

fn map_x(t: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (t / t_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = (y / y_max).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series_line(grid: &mut [Vec<char>], series: &[(f64, f64)], t_max: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in series {
        let x = map_x(t, t_max, width);
        let yy = map_y(y, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
