use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::models::RawDate;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve an IANA timezone name, falling back to UTC with a warning.
pub fn resolve_timezone(tz_name: &str) -> Tz {
    tz_name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("unrecognised timezone \"{}\", falling back to UTC", tz_name);
        Tz::UTC
    })
}

// ── Document dates ────────────────────────────────────────────────────────────

/// Date-time text layouts, tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

/// Date-only text layouts.  Day-first, as the source exports are Brazilian.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Interpret a document-date cell.
///
/// Returns `None` both for blank cells and for values that cannot be
/// parsed; callers distinguish the two by checking [`RawDate::Missing`].
pub fn parse_document_date(raw: &RawDate) -> Option<NaiveDate> {
    match raw {
        RawDate::Missing => None,
        RawDate::DateTime(dt) => Some(dt.date()),
        RawDate::Serial(serial) => excel_serial_to_date(*serial),
        RawDate::Text(text) => parse_date_text(text),
    }
}

/// Parse a textual date in any of the accepted layouts.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Convert a spreadsheet serial day number (1900 date system) to a date.
///
/// Serial 1 is 1900-01-01.  The fictitious 1900-02-29 (serial 60) maps to
/// 1900-02-28.  The fractional time-of-day part is ignored.
///
/// ```
/// use chrono::NaiveDate;
/// use dashboard_core::time_utils::excel_serial_to_date;
///
/// assert_eq!(excel_serial_to_date(45292.0), NaiveDate::from_ymd_opt(2024, 1, 1));
/// assert_eq!(excel_serial_to_date(0.0), None);
/// ```
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let base = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else if days == 60 {
        return NaiveDate::from_ymd_opt(1900, 2, 28);
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    base.checked_add_signed(TimeDelta::try_days(days)?)
}

// ── Display ───────────────────────────────────────────────────────────────────

/// Format a UTC instant in `tz` as `dd/mm/YYYY HH:MM`.
pub fn format_local_timestamp(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%d/%m/%Y %H:%M").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
