//! Spreadsheet and CSV decoding.
//!
//! Turns the raw bytes of one source into [`RawRecord`]s by locating the six
//! required columns in the header row.  XLSX-family workbooks are read with
//! `calamine`, delimited text with `csv`.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::NaiveDateTime;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{
    normalize_identifier, numeric_identifier, ColumnMapping, RawDate, RawRecord,
};
use tracing::debug;

// ── SourceFormat ──────────────────────────────────────────────────────────────

/// On-disk encoding of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Excel / OpenDocument workbook (first sheet is read).
    Workbook,
    /// Comma- or semicolon-delimited text.
    Csv,
}

impl SourceFormat {
    /// Pick a format from a file name or URL.  Anything that is not `.csv`
    /// is treated as a workbook.
    pub fn from_name(name: &str) -> Self {
        let path = name.split(['?', '#']).next().unwrap_or(name);
        if path.to_ascii_lowercase().ends_with(".csv") {
            SourceFormat::Csv
        } else {
            SourceFormat::Workbook
        }
    }
}

// ── Cell ──────────────────────────────────────────────────────────────────────

/// Format-neutral cell value.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Spreadsheet date-time, already resolved against the workbook's
    /// 1900 or 1904 date system.
    DateTime(NaiveDateTime),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn as_header(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().trim_start_matches('\u{feff}').to_string(),
            Cell::Number(n) => numeric_identifier(*n),
            Cell::DateTime(dt) => dt.to_string(),
        }
    }

    fn to_raw_date(&self) -> RawDate {
        match self {
            Cell::Empty => RawDate::Missing,
            Cell::Text(s) if s.trim().is_empty() => RawDate::Missing,
            Cell::Text(s) => RawDate::Text(s.trim().to_string()),
            Cell::Number(n) => RawDate::Serial(*n),
            Cell::DateTime(dt) => RawDate::DateTime(*dt),
        }
    }

    fn to_identifier(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => normalize_identifier(s),
            Cell::Number(n) => Some(numeric_identifier(*n)),
            Cell::DateTime(dt) => Some(dt.date().to_string()),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(n) => Cell::Number(*n),
            Data::Int(n) => Cell::Number(*n as f64),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => date_cell(dt),
            Data::DateTimeIso(s) => Cell::Text(s.clone()),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) => Cell::Empty,
        }
    }
}

/// Serials past this are far outside any real invoice date.
const MAX_DATE_SERIAL: f64 = 2_958_466.0;

/// Resolve a workbook date cell.  Values chrono cannot represent fall back
/// to the bare serial, which date parsing later rejects.
fn date_cell(dt: &ExcelDateTime) -> Cell {
    let serial = dt.as_f64();
    if !(serial.is_finite() && (0.0..MAX_DATE_SERIAL).contains(&serial)) {
        return Cell::Number(serial);
    }
    dt.as_datetime()
        .map(Cell::DateTime)
        .unwrap_or(Cell::Number(serial))
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decode one source into raw records.
///
/// `source_id` is only used in log and error messages.  The header row is
/// the first non-blank row; fully blank data rows are skipped.  A missing
/// required column is fatal.
pub fn read_records(
    source_id: &str,
    format: SourceFormat,
    bytes: &[u8],
    columns: &ColumnMapping,
) -> Result<Vec<RawRecord>> {
    let rows = match format {
        SourceFormat::Workbook => workbook_rows(source_id, bytes)?,
        SourceFormat::Csv => csv_rows(source_id, bytes)?,
    };

    let mut rows = rows.into_iter().filter(|(_, cells)| !row_is_blank(cells));
    let Some((_, header)) = rows.next() else {
        return Err(DashboardError::MissingColumn {
            column: columns.names()[0].to_string(),
            source_id: source_id.to_string(),
        });
    };

    let headers: Vec<String> = header.iter().map(Cell::as_header).collect();
    let idx = resolve_columns(source_id, &headers, columns)?;

    let records: Vec<RawRecord> = rows
        .map(|(row, cells)| {
            let cell = |i: usize| cells.get(i).unwrap_or(&Cell::Empty);
            RawRecord {
                row,
                document_date: cell(idx[0]).to_raw_date(),
                division: cell(idx[1]).to_identifier(),
                invoice: cell(idx[2]).to_identifier(),
                contract: cell(idx[3]).to_identifier(),
                client: cell(idx[4]).to_identifier(),
                project: cell(idx[5]).to_identifier(),
            }
        })
        .collect();

    debug!("Source {}: {} data rows", source_id, records.len());
    Ok(records)
}

/// Locate each required column in `headers`.
///
/// Exact (trimmed) matches win; otherwise a case-insensitive match is
/// accepted.  Returns indices in [`ColumnMapping::names`] order.
pub fn resolve_columns(
    source_id: &str,
    headers: &[String],
    columns: &ColumnMapping,
) -> Result<[usize; 6]> {
    let mut out = [0usize; 6];
    for (slot, wanted) in out.iter_mut().zip(columns.names()) {
        let wanted_trim = wanted.trim();
        let found = headers
            .iter()
            .position(|h| h == wanted_trim)
            .or_else(|| {
                let lower = wanted_trim.to_lowercase();
                headers.iter().position(|h| h.to_lowercase() == lower)
            });
        *slot = found.ok_or_else(|| DashboardError::MissingColumn {
            column: wanted.to_string(),
            source_id: source_id.to_string(),
        })?;
    }
    Ok(out)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn row_is_blank(cells: &[Cell]) -> bool {
    cells.iter().all(Cell::is_empty)
}

/// Read the first worksheet into `(sheet_row_number, cells)` pairs.
fn workbook_rows(source_id: &str, bytes: &[u8]) -> Result<Vec<(usize, Vec<Cell>)>> {
    let spreadsheet_err = |message: String| DashboardError::Spreadsheet {
        source_id: source_id.to_string(),
        message,
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| spreadsheet_err(format!("failed to open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_err("workbook contains no sheets".to_string()))?
        .map_err(|e| spreadsheet_err(format!("failed to read first sheet: {e}")))?;

    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

    Ok(range
        .rows()
        .enumerate()
        .map(|(i, row)| (first_row + i + 1, row.iter().map(Cell::from).collect()))
        .collect())
}

/// Read delimited text into `(line_number, cells)` pairs.
fn csv_rows(source_id: &str, bytes: &[u8]) -> Result<Vec<(usize, Vec<Cell>)>> {
    let delimiter = detect_delimiter(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (i, result) in reader.byte_records().enumerate() {
        let record = result.map_err(|e| DashboardError::Spreadsheet {
            source_id: source_id.to_string(),
            message: e.to_string(),
        })?;
        let cells = record
            .iter()
            .map(|field| {
                let text = String::from_utf8_lossy(field);
                if text.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(text.into_owned())
                }
            })
            .collect();
        // The reader skips blank lines, so the record index can lag the
        // physical line number.
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 1);
        rows.push((line, cells));
    }
    Ok(rows)
}

/// Choose `;` when the first line has more semicolons than commas.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or(&[]);
    let semicolons = first_line.iter().filter(|&&b| b == b';').count();
    let commas = first_line.iter().filter(|&&b| b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
