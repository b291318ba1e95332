//! Distinct-count aggregation, globally and per month.

use std::collections::{BTreeMap, HashSet};

use dashboard_core::models::{DistinctCounts, MonthBucket, MonthlyRow, Record};

// ── DistinctSets ──────────────────────────────────────────────────────────────

/// Running sets of identifiers seen within one group of records.
#[derive(Debug, Clone, Default)]
pub struct DistinctSets<'a> {
    invoices: HashSet<&'a str>,
    contracts: HashSet<&'a str>,
    clients: HashSet<&'a str>,
    projects: HashSet<&'a str>,
}

impl<'a> DistinctSets<'a> {
    /// Add a record's identifiers.  Missing values are not counted.
    pub fn add_record(&mut self, record: &'a Record) {
        if let Some(v) = record.invoice.as_deref() {
            self.invoices.insert(v);
        }
        if let Some(v) = record.contract.as_deref() {
            self.contracts.insert(v);
        }
        if let Some(v) = record.client.as_deref() {
            self.clients.insert(v);
        }
        if let Some(v) = record.project.as_deref() {
            self.projects.insert(v);
        }
    }

    pub fn counts(&self) -> DistinctCounts {
        DistinctCounts {
            invoices: self.invoices.len(),
            contracts: self.contracts.len(),
            clients: self.clients.len(),
            projects: self.projects.len(),
        }
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Global counts plus the chronologically sorted per-month table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub totals: DistinctCounts,
    pub monthly: Vec<MonthlyRow>,
}

/// Stateless helper that groups records by month bucket.
pub struct RecordAggregator;

impl RecordAggregator {
    /// Distinct counts over the whole input.
    pub fn distinct_counts<'a>(records: impl IntoIterator<Item = &'a Record>) -> DistinctCounts {
        let mut sets = DistinctSets::default();
        for record in records {
            sets.add_record(record);
        }
        sets.counts()
    }

    /// One row per month present in `records`, sorted ascending.
    ///
    /// Months with no records do not appear.
    pub fn aggregate_monthly<'a>(
        records: impl IntoIterator<Item = &'a Record>,
    ) -> Vec<MonthlyRow> {
        // BTreeMap keeps months in chronological order.
        let mut map: BTreeMap<MonthBucket, DistinctSets<'a>> = BTreeMap::new();
        for record in records {
            map.entry(record.month).or_default().add_record(record);
        }

        map.into_iter()
            .map(|(month, sets)| MonthlyRow {
                month,
                counts: sets.counts(),
            })
            .collect()
    }

    /// Global counts and the monthly table for `records`.
    pub fn aggregate(records: &[&Record]) -> Aggregation {
        Aggregation {
            totals: Self::distinct_counts(records.iter().copied()),
            monthly: Self::aggregate_monthly(records.iter().copied()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
