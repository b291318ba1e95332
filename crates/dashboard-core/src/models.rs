use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DashboardError;

// ── MonthBucket ───────────────────────────────────────────────────────────────

/// Calendar month used as the grouping key for time-series aggregation.
///
/// Ordering is chronological, which matches the lexicographic order of the
/// `YYYY-MM` display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthBucket {
    year: i32,
    month: u32,
}

impl MonthBucket {
    /// Build a bucket, returning `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Bucket containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthBucket {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DashboardError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Raw records ───────────────────────────────────────────────────────────────

/// A document-date cell as it came out of the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDate {
    /// Free text, e.g. `"2024-01-05"` or `"05/01/2024"`.
    Text(String),
    /// Spreadsheet serial day number (1900 date system).
    Serial(f64),
    /// Already-typed date-time.
    DateTime(NaiveDateTime),
    /// Blank cell.
    Missing,
}

/// One invoicing line before temporal normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based sheet row (or CSV line) number within its source.
    pub row: usize,
    pub document_date: RawDate,
    pub division: Option<String>,
    pub invoice: Option<String>,
    pub contract: Option<String>,
    pub client: Option<String>,
    pub project: Option<String>,
}

// ── Record ────────────────────────────────────────────────────────────────────

/// A normalized invoicing line annotated with its month bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub document_date: NaiveDate,
    pub month: MonthBucket,
    pub division: Option<String>,
    /// Invoice document number.
    pub invoice: Option<String>,
    pub contract: Option<String>,
    pub client: Option<String>,
    /// Project / work code.
    pub project: Option<String>,
}

// ── ColumnMapping ─────────────────────────────────────────────────────────────

/// Header names of the six required columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub document_date: String,
    pub division: String,
    pub invoice: String,
    pub contract: String,
    pub client: String,
    pub project: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            document_date: "Data do documento".to_string(),
            division: "Divisão".to_string(),
            invoice: "Nº documento de Faturamento".to_string(),
            contract: "Contrato".to_string(),
            client: "Cliente".to_string(),
            project: "Código da Obra".to_string(),
        }
    }
}

impl ColumnMapping {
    /// Column names in reading order: date, division, invoice, contract,
    /// client, project.
    pub fn names(&self) -> [&str; 6] {
        [
            &self.document_date,
            &self.division,
            &self.invoice,
            &self.contract,
            &self.client,
            &self.project,
        ]
    }
}

// ── Aggregates ────────────────────────────────────────────────────────────────

/// The four distinct-counts reported per record subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinctCounts {
    pub invoices: usize,
    pub contracts: usize,
    pub clients: usize,
    pub projects: usize,
}

/// One row of the per-month aggregate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRow {
    pub month: MonthBucket,
    #[serde(flatten)]
    pub counts: DistinctCounts,
}

// ── FilterSelection ───────────────────────────────────────────────────────────

/// User-selected divisions and months.  An empty set places no restriction
/// on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub divisions: BTreeSet<String>,
    pub months: BTreeSet<MonthBucket>,
}

impl FilterSelection {
    /// Selection that lets every record through.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(
        divisions: impl IntoIterator<Item = String>,
        months: impl IntoIterator<Item = MonthBucket>,
    ) -> Self {
        Self {
            divisions: divisions.into_iter().collect(),
            months: months.into_iter().collect(),
        }
    }

    /// `true` when `record` passes both dimensions.
    pub fn matches(&self, record: &Record) -> bool {
        let division_ok = self.divisions.is_empty()
            || record
                .division
                .as_ref()
                .is_some_and(|d| self.divisions.contains(d));
        let month_ok = self.months.is_empty() || self.months.contains(&record.month);
        division_ok && month_ok
    }
}

// ── Identifier normalisation ──────────────────────────────────────────────────

/// Normalise a textual identifier cell.
///
/// Trims whitespace and maps blank text to `None`.  Numeric text with an
/// all-zero fractional part loses it, so `"1234.0"` and `"1234"` compare
/// equal.
///
/// # Examples
///
/// ```
/// use dashboard_core::models::normalize_identifier;
///
/// assert_eq!(normalize_identifier("  1234.0 "), Some("1234".to_string()));
/// assert_eq!(normalize_identifier("CT-10"), Some("CT-10".to_string()));
/// assert_eq!(normalize_identifier("   "), None);
/// ```
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some((int_part, frac_part)) = trimmed.split_once('.') {
        if !int_part.is_empty()
            && int_part.chars().all(|c| c.is_ascii_digit())
            && !frac_part.is_empty()
            && frac_part.chars().all(|c| c == '0')
        {
            return Some(int_part.to_string());
        }
    }
    Some(trimmed.to_string())
}

/// Render a numeric identifier cell, dropping a zero fractional part.
pub fn numeric_identifier(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
