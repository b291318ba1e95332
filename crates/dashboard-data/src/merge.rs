//! Concatenation of per-source batches with full-row deduplication.

use std::collections::HashSet;

use dashboard_core::models::Record;

/// Result of [`merge_sources`].
#[derive(Debug, Clone, Default)]
pub struct Merged {
    pub records: Vec<Record>,
    pub duplicates_removed: usize,
}

/// Concatenate `batches` in order, dropping rows identical to an earlier
/// one.  The first occurrence is kept.
pub fn merge_sources(batches: impl IntoIterator<Item = Vec<Record>>) -> Merged {
    let mut seen: HashSet<Record> = HashSet::new();
    let mut merged = Merged::default();

    for record in batches.into_iter().flatten() {
        if seen.contains(&record) {
            merged.duplicates_removed += 1;
            continue;
        }
        seen.insert(record.clone());
        merged.records.push(record);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::MonthBucket;

    fn rec(day: u32, invoice: &str) -> Record {
        let d = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        Record {
            document_date: d,
            month: MonthBucket::from_date(d),
            division: Some("A".to_string()),
            invoice: Some(invoice.to_string()),
            contract: Some("10".to_string()),
            client: Some("100".to_string()),
            project: None,
        }
    }

    #[test]
    fn test_concatenates_in_order() {
        let merged = merge_sources(vec![vec![rec(1, "1")], vec![rec(2, "2"), rec(3, "3")]]);
        let invoices: Vec<&str> = merged
            .records
            .iter()
            .map(|r| r.invoice.as_deref().unwrap())
            .collect();
        assert_eq!(invoices, vec!["1", "2", "3"]);
        assert_eq!(merged.duplicates_removed, 0);
    }

    #[test]
    fn test_self_concatenation_is_idempotent() {
        let batch = vec![rec(1, "1"), rec(2, "2"), rec(2, "3")];
        let once = merge_sources(vec![batch.clone()]);
        let twice = merge_sources(vec![batch.clone(), batch]);
        assert_eq!(once.records, twice.records);
        assert_eq!(twice.duplicates_removed, 3);
    }

    #[test]
    fn test_same_invoice_on_different_dates_kept() {
        let merged = merge_sources(vec![vec![rec(1, "1"), rec(2, "1")]]);
        assert_eq!(merged.records.len(), 2);
    }

    #[test]
    fn test_empty() {
        let merged = merge_sources(Vec::<Vec<Record>>::new());
        assert!(merged.records.is_empty());
    }
}
