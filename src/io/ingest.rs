//! Spreadsheet ingest and normalization.
//!
//! This module is responsible for turning a showroom sheet (CSV or an Excel/ODS
//! workbook) into a clean, date-sorted `RecordSet`.
//!
//! Design goals:
//! - **Loose header matching** (`Walk-in Customer`, `walk_ins`, ... all work)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no aggregation logic here

use std::fs::File;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::domain::{Record, RecordSet};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line (CSV) or sheet row (workbook) of the offending row.
    pub line: usize,
    pub message: String,
}

/// Ingest output: sorted records + row errors + provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub source: PathBuf,
    pub records: RecordSet,
    pub row_errors: Vec<RowError>,
    /// Non-blank data rows examined (valid + skipped).
    pub rows_read: usize,
}

impl LoadedData {
    pub fn rows_used(&self) -> usize {
        self.records.len()
    }

    pub fn rows_skipped(&self) -> usize {
        self.row_errors.len()
    }
}

/// A normalized spreadsheet cell.
///
/// CSV cells are always `Text`/`Empty`; workbooks can also yield numbers and
/// native dates.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn text(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Header row plus data rows, before any typing.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// `(line, cells)` for each data row.
    pub rows: Vec<(usize, Vec<Cell>)>,
    /// Rows the reader itself could not decode.
    pub read_errors: Vec<RowError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Csv,
    Workbook,
}

/// Column indexes for the three required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    date: usize,
    walk_ins: usize,
    test_drives: usize,
}

/// Load a showroom sheet into a sorted record set.
///
/// The file is opened, fully read, and closed before this returns.
pub fn load_records(path: &Path) -> Result<LoadedData, AppError> {
    let table = match source_kind(path)? {
        SourceKind::Csv => read_csv_table(path)?,
        SourceKind::Workbook => read_workbook_table(path)?,
    };
    let data = records_from_table(path, table)?;

    tracing::info!(
        source = %path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used(),
        rows_skipped = data.rows_skipped(),
        "loaded dataset"
    );
    Ok(data)
}

/// Type the rows of an already-read table.
pub fn records_from_table(source: &Path, table: RawTable) -> Result<LoadedData, AppError> {
    let columns = resolve_columns(&table.headers)?;

    let mut row_errors = table.read_errors;
    let mut rows_read = row_errors.len();
    let mut records = Vec::with_capacity(table.rows.len());

    for (line, cells) in table.rows {
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        rows_read += 1;

        match parse_row(&cells, columns) {
            Ok(record) => records.push(record),
            Err(message) => {
                tracing::debug!(line, %message, "skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    row_errors.sort_by_key(|e| e.line);

    Ok(LoadedData {
        source: source.to_path_buf(),
        records: RecordSet::from_unsorted(records),
        row_errors,
        rows_read,
    })
}

fn source_kind(path: &Path) -> Result<SourceKind, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" => Ok(SourceKind::Csv),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceKind::Workbook),
        _ => Err(AppError::input(format!(
            "Unsupported file type '{}'. Expected .csv, .xlsx, .xlsm, .xlsb, .xls or .ods.",
            path.display()
        ))),
    }
}

fn read_csv_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = RawTable {
        headers,
        ..RawTable::default()
    };

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header and lines are 1-based.
        let fallback_line = idx + 2;
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                table.rows.push((line, record.iter().map(Cell::text).collect()));
            }
            Err(e) => table.read_errors.push(RowError {
                line: fallback_line,
                message: format!("CSV parse error: {e}"),
            }),
        }
    }

    Ok(table)
}

fn read_workbook_table(path: &Path) -> Result<RawTable, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::input(format!("Failed to open workbook '{}': {e}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::input(format!("Workbook '{}' has no worksheets.", path.display())))?
        .map_err(|e| AppError::input(format!("Failed to read first worksheet: {e}")))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();

    // Sheet row numbers are 1-based and the header occupies row 1.
    let rows = rows
        .enumerate()
        .map(|(idx, row)| (idx + 2, row.iter().map(cell_from_data).collect()))
        .collect();

    Ok(RawTable {
        headers,
        rows,
        read_errors: Vec::new(),
    })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) => Cell::text(s),
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(date) => Cell::Date(date),
            None => Cell::text(&data.to_string()),
        },
        other => Cell::text(&other.to_string()),
    }
}

/// Convert an Excel serial day number (1900 date system) to a calendar date.
///
/// The fractional part (time of day) is discarded. Excel counts a
/// nonexistent 1900-02-29 as serial 60, so serials below 60 use an epoch one
/// day later and 60 itself has no date.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as u64;
    let epoch = match days {
        60 => return None,
        0..60 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_days(Days::new(days))
}

fn resolve_columns(headers: &[String]) -> Result<ColumnMap, AppError> {
    let mut date = None;
    let mut walk_ins = None;
    let mut test_drives = None;

    for (idx, raw) in headers.iter().enumerate() {
        let name = normalize_header_name(raw);
        if name.contains("date") {
            date.get_or_insert(idx);
        } else if name.contains("walk") {
            walk_ins.get_or_insert(idx);
        } else if name.contains("test") && name.contains("drive") {
            test_drives.get_or_insert(idx);
        }
    }

    let mut missing = Vec::new();
    if date.is_none() {
        missing.push("date");
    }
    if walk_ins.is_none() {
        missing.push("walk-in count");
    }
    if test_drives.is_none() {
        missing.push("test-drive count");
    }

    match (date, walk_ins, test_drives) {
        (Some(date), Some(walk_ins), Some(test_drives)) => Ok(ColumnMap {
            date,
            walk_ins,
            test_drives,
        }),
        _ => Err(AppError::input(format!(
            "Missing required column(s): {}. Found headers: [{}]",
            missing.join(", "),
            headers.join(", ")
        ))),
    }
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, column matching may miss `Date`.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(cells: &[Cell], columns: ColumnMap) -> Result<Record, String> {
    let cell = |idx: usize| cells.get(idx).unwrap_or(&Cell::Empty);

    let date = parse_date_cell(cell(columns.date))?;
    let walk_ins = parse_count(cell(columns.walk_ins), "walk-in")?;
    let test_drives = parse_count(cell(columns.test_drives), "test-drive")?;

    Ok(Record::new(date, walk_ins, test_drives))
}

fn parse_date_cell(cell: &Cell) -> Result<NaiveDate, String> {
    match cell {
        Cell::Date(d) => Ok(*d),
        Cell::Number(v) => excel_serial_to_date(*v).ok_or_else(|| format!("Invalid date serial {v}.")),
        Cell::Text(s) => parse_date(s),
        Cell::Empty => Err("Missing date.".to_string()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are the norm. Slash/dash dates are read month-first, and only
    // read day-first when the first field cannot be a month (`13/01/2024`).
    const FMTS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, DD/MM/YYYY."
    ))
}

fn parse_count(cell: &Cell, column: &str) -> Result<u32, String> {
    match cell {
        Cell::Empty => Ok(0),
        Cell::Number(v) => whole_count(*v)
            .ok_or_else(|| format!("Invalid {column} count {v} (expected a non-negative whole number).")),
        Cell::Text(s) => s
            .parse::<u32>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().and_then(whole_count))
            .ok_or_else(|| format!("Invalid {column} count '{s}' (expected a non-negative whole number).")),
        Cell::Date(d) => Err(format!("Invalid {column} count: found a date ({d}).")),
    }
}

fn whole_count(v: f64) -> Option<u32> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Some(v as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_csv_sorted_and_counts_skipped_rows() {
        let file = write_temp(
            ".csv",
            "\u{feff}Date,Walk-in Customer,Test Drive\n\
             2024-01-03,12,4\n\
             2024-01-01,10,3\n\
             not-a-date,5,1\n\
             2024-01-02,many,1\n\
             ,,\n\
             01/13/2024,5,1\n\
             02/01/2024,6,2\n",
        );

        let data = load_records(file.path()).unwrap();
        let rows: Vec<(NaiveDate, u32, u32)> = data
            .records
            .iter()
            .map(|r| (r.date, r.walk_ins, r.test_drives))
            .collect();
        assert_eq!(
            rows,
            vec![
                (d(2024, 1, 1), 10, 3),
                (d(2024, 1, 3), 12, 4),
                (d(2024, 1, 13), 5, 1),
                (d(2024, 2, 1), 6, 2),
            ]
        );
        assert_eq!(data.rows_read, 6);
        assert_eq!(data.rows_skipped(), 2);
        assert_eq!(data.row_errors[0].line, 4);
        assert!(data.row_errors[0].message.contains("not-a-date"));
        assert_eq!(data.row_errors[1].line, 5);
    }

    #[test]
    fn header_matching_is_loose() {
        let headers = vec![
            "Branch".to_string(),
            " TEST DRIVES ".to_string(),
            "walk_ins".to_string(),
            "Visit Date".to_string(),
        ];
        let cols = resolve_columns(&headers).unwrap();
        assert_eq!(
            cols,
            ColumnMap {
                date: 3,
                walk_ins: 2,
                test_drives: 1
            }
        );
    }

    #[test]
    fn missing_column_is_input_error() {
        let file = write_temp(".csv", "Date,Walk-ins\n2024-01-01,3\n");
        let err = load_records(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.message().contains("test-drive"));
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = load_records(Path::new("definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_records(Path::new("data.json")).unwrap_err();
        assert!(err.message().contains("Unsupported file type"));
    }

    #[test]
    fn workbook_cells_are_typed() {
        let table = RawTable {
            headers: vec!["Date".into(), "Walk-in Customer".into(), "Test Drive".into()],
            rows: vec![
                // 45292 is 2024-01-01 in the 1900 date system.
                (2, vec![Cell::Number(45292.0), Cell::Number(10.0), Cell::Number(3.0)]),
                (3, vec![Cell::Date(d(2024, 1, 2)), Cell::Number(7.0), Cell::Empty]),
                (4, vec![Cell::Text("2024-01-03 00:00:00".into()), Cell::Number(2.5), Cell::Number(1.0)]),
                (5, vec![Cell::Date(d(2024, 1, 4)), Cell::Number(-1.0), Cell::Number(0.0)]),
                (6, vec![Cell::Empty, Cell::Empty, Cell::Empty]),
                (7, vec![Cell::Text("2024-01-05T09:30:00".into()), Cell::Number(3.0)]),
            ],
            read_errors: Vec::new(),
        };

        let data = records_from_table(Path::new("book.xlsx"), table).unwrap();
        let rows: Vec<(NaiveDate, u32, u32)> = data
            .records
            .iter()
            .map(|r| (r.date, r.walk_ins, r.test_drives))
            .collect();
        assert_eq!(
            rows,
            vec![
                (d(2024, 1, 1), 10, 3),
                (d(2024, 1, 2), 7, 0),
                (d(2024, 1, 5), 3, 0),
            ]
        );
        assert_eq!(data.rows_read, 5);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![4, 5]);
    }

    #[test]
    fn excel_serials_convert() {
        assert_eq!(excel_serial_to_date(45292.75), Some(d(2024, 1, 1)));
        assert_eq!(excel_serial_to_date(1.0), Some(d(1900, 1, 1)));
        assert_eq!(excel_serial_to_date(59.0), Some(d(1900, 2, 28)));
        assert_eq!(excel_serial_to_date(60.0), None);
        assert_eq!(excel_serial_to_date(61.0), Some(d(1900, 3, 1)));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn slash_dates_read_month_first() {
        assert_eq!(parse_date("02/01/2024"), Ok(d(2024, 2, 1)));
        assert_eq!(parse_date("01/13/2024"), Ok(d(2024, 1, 13)));
        assert_eq!(parse_date("13/01/2024"), Ok(d(2024, 1, 13)));
        assert_eq!(parse_date("02-01-2024"), Ok(d(2024, 2, 1)));
        assert_eq!(parse_date("2024/02/01"), Ok(d(2024, 2, 1)));
        assert!(parse_date("13/13/2024").is_err());
    }

    #[test]
    fn loads_xlsx_first_sheet() {
        use rust_xlsxwriter::{Format, Workbook};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let date_fmt = Format::new().set_num_format("yyyy-mm-dd");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Date").unwrap();
        sheet.write_string(0, 1, "Walk-in Customer").unwrap();
        sheet.write_string(0, 2, "Test Drive").unwrap();
        // 45292 is 2024-01-01.
        sheet.write_number_with_format(1, 0, 45292.0, &date_fmt).unwrap();
        sheet.write_number(1, 1, 10.0).unwrap();
        sheet.write_number(1, 2, 3.0).unwrap();
        sheet.write_string(2, 0, "02/01/2024").unwrap();
        sheet.write_number(2, 1, 5.0).unwrap();
        sheet.write_number(2, 2, 1.0).unwrap();
        sheet.write_string(3, 0, "soon").unwrap();
        sheet.write_number(3, 1, 4.0).unwrap();
        sheet.write_number(3, 2, 1.0).unwrap();
        sheet.write_number_with_format(4, 0, 45294.0, &date_fmt).unwrap();
        sheet.write_number(4, 1, 7.0).unwrap();
        workbook.save(&path).unwrap();

        let data = load_records(&path).unwrap();
        let rows: Vec<(NaiveDate, u32, u32)> = data
            .records
            .iter()
            .map(|r| (r.date, r.walk_ins, r.test_drives))
            .collect();
        assert_eq!(
            rows,
            vec![
                (d(2024, 1, 1), 10, 3),
                (d(2024, 1, 3), 7, 0),
                (d(2024, 2, 1), 5, 1),
            ]
        );
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 4);
        assert!(data.row_errors[0].message.contains("soon"));
    }

    #[test]
    fn corrupt_workbook_is_input_error() {
        let file = write_temp(".xlsx", "this is not a zip archive");
        let err = load_records(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.message().contains("Failed to open workbook"));
    }

    #[test]
    fn counts_accept_integral_text() {
        assert_eq!(parse_count(&Cell::Text("12".into()), "walk-in"), Ok(12));
        assert_eq!(parse_count(&Cell::Text("12.0".into()), "walk-in"), Ok(12));
        assert!(parse_count(&Cell::Text("12.5".into()), "walk-in").is_err());
        assert!(parse_count(&Cell::Text("-3".into()), "walk-in").is_err());
        assert_eq!(parse_count(&Cell::Empty, "walk-in"), Ok(0));
    }
}
