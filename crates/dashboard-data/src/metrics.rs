//! Ratios and monthly averages derived from distinct counts.

use dashboard_core::models::{DistinctCounts, MonthlyRow};
use serde::{Deserialize, Serialize};

/// `numerator / denominator`, or `0.0` when the denominator is zero.
pub fn safe_ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Cross-dimension ratios over the filtered set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioMetrics {
    pub invoices_per_client: f64,
    pub invoices_per_contract: f64,
    pub clients_per_project: f64,
}

impl RatioMetrics {
    pub fn from_counts(counts: &DistinctCounts) -> Self {
        Self {
            invoices_per_client: safe_ratio(counts.invoices, counts.clients),
            invoices_per_contract: safe_ratio(counts.invoices, counts.contracts),
            clients_per_project: safe_ratio(counts.clients, counts.projects),
        }
    }
}

/// Mean of each count column over the months present in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverages {
    pub invoices: f64,
    pub contracts: f64,
    pub clients: f64,
    pub projects: f64,
}

impl MonthlyAverages {
    /// All zeros for an empty table.
    pub fn from_rows(rows: &[MonthlyRow]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let n = rows.len();
        let sum = |f: fn(&DistinctCounts) -> usize| -> usize {
            rows.iter().map(|r| f(&r.counts)).sum()
        };
        Self {
            invoices: safe_ratio(sum(|c| c.invoices), n),
            contracts: safe_ratio(sum(|c| c.contracts), n),
            clients: safe_ratio(sum(|c| c.clients), n),
            projects: safe_ratio(sum(|c| c.projects), n),
        }
    }
}
