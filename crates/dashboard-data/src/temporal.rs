//! Temporal normalization: raw rows to month-bucketed [`Record`]s.

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{MonthBucket, RawDate, RawRecord, Record};
use dashboard_core::time_utils::parse_document_date;
use tracing::warn;

/// Output of [`normalize_records`].
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<Record>,
    /// Rows dropped because their document-date cell was blank.
    pub skipped_blank_dates: usize,
}

/// Parse every row's document date and attach its month bucket.
///
/// Rows with a blank date are skipped and counted.  Any other date that
/// cannot be parsed aborts the whole batch with [`DashboardError::DateParse`].
/// Row order is preserved.
pub fn normalize_records(source_id: &str, raw: Vec<RawRecord>) -> Result<Normalized> {
    let mut out = Normalized {
        records: Vec::with_capacity(raw.len()),
        skipped_blank_dates: 0,
    };

    for row in raw {
        if row.document_date == RawDate::Missing {
            out.skipped_blank_dates += 1;
            continue;
        }

        let document_date =
            parse_document_date(&row.document_date).ok_or_else(|| DashboardError::DateParse {
                source_id: source_id.to_string(),
                row: row.row,
                value: describe(&row.document_date),
            })?;

        out.records.push(Record {
            document_date,
            month: MonthBucket::from_date(document_date),
            division: row.division,
            invoice: row.invoice,
            contract: row.contract,
            client: row.client,
            project: row.project,
        });
    }

    if out.skipped_blank_dates > 0 {
        warn!(
            "{}: skipped {} row(s) with a blank document date",
            source_id, out.skipped_blank_dates
        );
    }

    Ok(out)
}

fn describe(raw: &RawDate) -> String {
    match raw {
        RawDate::Text(s) => s.clone(),
        RawDate::Serial(n) => n.to_string(),
        RawDate::DateTime(dt) => dt.to_string(),
        RawDate::Missing => String::new(),
    }
}
