//! Export the filtered table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one line per source row (duplicates are *not* merged), plus the
//! row's conversion rate in percent.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::analytics::conversion_rate;
use crate::domain::RecordSet;
use crate::error::AppError;

/// Suggested file name when the user doesn't pick one.
pub const DEFAULT_EXPORT_NAME: &str = "filtered_customer_data.csv";

const HEADER: [&str; 4] = ["Date", "Walk-in Customer", "Test Drive", "Conversion Rate (%)"];

/// Write the filtered records to a CSV file.
pub fn write_filtered_csv(path: &Path, records: &RecordSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_rows(file, records)?;

    tracing::info!(path = %path.display(), rows = records.len(), "wrote filtered CSV");
    Ok(())
}

fn write_rows<W: Write>(out: W, records: &RecordSet) -> Result<W, AppError> {
    let mut writer = csv::Writer::from_writer(out);

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        let rate = conversion_rate(u64::from(r.test_drives), u64::from(r.walk_ins)) * 100.0;
        writer
            .write_record([
                r.date.to_string(),
                r.walk_ins.to_string(),
                r.test_drives.to_string(),
                format!("{rate:.2}"),
            ])
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))
}
