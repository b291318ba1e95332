//! Report pipeline.
//!
//! Filters the in-memory record set, aggregates it and derives the ratio
//! metrics, returning a [`DashboardReport`] ready for the UI layer.

use std::time::Instant;

use chrono::Utc;
use dashboard_core::models::{DistinctCounts, FilterSelection, MonthlyRow, Record};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::RecordAggregator;
use crate::filter::apply_filter;
use crate::metrics::{MonthlyAverages, RatioMetrics};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Records available before filtering.
    pub records_total: usize,
    /// Records that passed the selection.
    pub records_filtered: usize,
    /// Selection the report was computed for.
    pub selection: FilterSelection,
    /// Wall-clock seconds spent filtering and aggregating.
    pub compute_time_seconds: f64,
}

/// Everything the presentation layer shows for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub totals: DistinctCounts,
    pub ratios: RatioMetrics,
    pub monthly_averages: MonthlyAverages,
    /// One row per month present after filtering, ascending.
    pub monthly: Vec<MonthlyRow>,
    pub metadata: ReportMetadata,
}

impl DashboardReport {
    /// `true` when no record passed the selection.
    pub fn is_empty(&self) -> bool {
        self.metadata.records_filtered == 0
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Compute the report for `selection` over `records`.
///
/// Pure apart from the timestamp; `records` is not modified.
pub fn build_report(records: &[Record], selection: &FilterSelection) -> DashboardReport {
    let start = Instant::now();

    let filtered = apply_filter(records, selection);
    let aggregation = RecordAggregator::aggregate(&filtered);
    let ratios = RatioMetrics::from_counts(&aggregation.totals);
    let monthly_averages = MonthlyAverages::from_rows(&aggregation.monthly);

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        records_total: records.len(),
        records_filtered: filtered.len(),
        selection: selection.clone(),
        compute_time_seconds: start.elapsed().as_secs_f64(),
    };

    debug!(
        "Report: {}/{} records, {} month(s)",
        metadata.records_filtered,
        metadata.records_total,
        aggregation.monthly.len()
    );

    DashboardReport {
        totals: aggregation.totals,
        ratios,
        monthly_averages,
        monthly: aggregation.monthly,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::MonthBucket;

    use crate::filter::FilterOptions;

    fn rec(date: &str, division: &str, invoice: &str, contract: &str, client: &str, project: &str) -> Record {
        let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Record {
            document_date: d,
            month: MonthBucket::from_date(d),
            division: Some(division.to_string()),
            invoice: Some(invoice.to_string()),
            contract: Some(contract.to_string()),
            client: Some(client.to_string()),
            project: Some(project.to_string()),
        }
    }

    /// Three lines across two months and two divisions.
    fn worked_example() -> Vec<Record> {
        vec![
            rec("2024-01-05", "A", "1", "10", "100", "1000"),
            rec("2024-01-20", "A", "2", "10", "100", "1000"),
            rec("2024-02-01", "B", "3", "11", "101", "1001"),
        ]
    }

    fn counts(invoices: usize, contracts: usize, clients: usize, projects: usize) -> DistinctCounts {
        DistinctCounts {
            invoices,
            contracts,
            clients,
            projects,
        }
    }

    #[test]
    fn test_worked_example_unfiltered() {
        let report = build_report(&worked_example(), &FilterSelection::all());

        assert_eq!(report.totals, counts(3, 2, 2, 2));
        assert_eq!(report.monthly.len(), 2);
        assert_eq!(report.monthly[0].month.to_string(), "2024-01");
        assert_eq!(report.monthly[0].counts, counts(2, 1, 1, 1));
        assert_eq!(report.monthly[1].month.to_string(), "2024-02");
        assert_eq!(report.monthly[1].counts, counts(1, 1, 1, 1));
        assert!((report.ratios.invoices_per_client - 1.5).abs() < 1e-12);
        assert!((report.ratios.invoices_per_contract - 1.5).abs() < 1e-12);
        assert!((report.ratios.clients_per_project - 1.0).abs() < 1e-12);
        assert!((report.monthly_averages.invoices - 1.5).abs() < 1e-12);
        assert_eq!(report.metadata.records_total, 3);
        assert_eq!(report.metadata.records_filtered, 3);
    }

    #[test]
    fn test_worked_example_division_b() {
        let sel = FilterSelection::new(vec!["B".to_string()], vec![]);
        let report = build_report(&worked_example(), &sel);

        assert_eq!(report.metadata.records_filtered, 1);
        assert_eq!(report.totals, counts(1, 1, 1, 1));
        assert_eq!(report.monthly.len(), 1);
        assert_eq!(report.monthly[0].month.to_string(), "2024-02");
    }

    #[test]
    fn test_full_selection_equals_empty_selection() {
        let records = worked_example();
        let all = FilterOptions::from_records(&records).select_all();
        let a = build_report(&records, &all);
        let b = build_report(&records, &FilterSelection::all());
        assert_eq!(a.totals, b.totals);
        assert_eq!(a.monthly, b.monthly);
        assert_eq!(a.ratios, b.ratios);
    }

    #[test]
    fn test_selection_matching_nothing_yields_zeros() {
        let sel = FilterSelection::new(vec!["Z".to_string()], vec![]);
        let report = build_report(&worked_example(), &sel);
        assert!(report.is_empty());
        assert_eq!(report.totals, DistinctCounts::default());
        assert!(report.monthly.is_empty());
        assert_eq!(report.ratios, RatioMetrics::default());
        assert_eq!(report.monthly_averages, MonthlyAverages::default());
    }

    #[test]
    fn test_empty_records() {
        let report = build_report(&[], &FilterSelection::all());
        assert!(report.is_empty());
        assert_eq!(report.metadata.records_total, 0);
    }

    #[test]
    fn test_report_serializes_months_as_strings() {
        let report = build_report(&worked_example(), &FilterSelection::all());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["monthly"][0]["month"], "2024-01");
        assert_eq!(json["monthly"][0]["invoices"], 2);
        assert_eq!(json["totals"]["clients"], 2);
    }

    #[test]
    fn test_records_not_modified() {
        let records = worked_example();
        let before = records.clone();
        let _ = build_report(&records, &FilterSelection::new(vec!["A".to_string()], vec![]));
        assert_eq!(records, before);
    }
}
