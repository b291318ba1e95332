//! Division / month filtering and the option lists that drive it.

use std::collections::BTreeSet;

use dashboard_core::models::{FilterSelection, MonthBucket, Record};
use serde::{Deserialize, Serialize};

/// Keep the records that pass `selection`, in their original order.
pub fn apply_filter<'a>(records: &'a [Record], selection: &FilterSelection) -> Vec<&'a Record> {
    records.iter().filter(|r| selection.matches(r)).collect()
}

/// Distinct values available for selection, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub divisions: Vec<String>,
    pub months: Vec<MonthBucket>,
}

impl FilterOptions {
    /// Collect the option lists from the full (unfiltered) record set.
    /// Records without a division contribute no division option.
    pub fn from_records(records: &[Record]) -> Self {
        let divisions: BTreeSet<&str> = records
            .iter()
            .filter_map(|r| r.division.as_deref())
            .collect();
        let months: BTreeSet<MonthBucket> = records.iter().map(|r| r.month).collect();

        Self {
            divisions: divisions.into_iter().map(str::to_string).collect(),
            months: months.into_iter().collect(),
        }
    }

    /// A selection containing every option.
    pub fn select_all(&self) -> FilterSelection {
        FilterSelection::new(self.divisions.iter().cloned(), self.months.iter().copied())
    }
}
