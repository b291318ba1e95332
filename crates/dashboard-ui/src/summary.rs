//! Plain-text report for non-interactive output.

use std::fmt::Write;

use dashboard_core::formatting::{format_count, format_number, format_ratio, percentage, Locale};
use dashboard_core::models::FilterSelection;
use dashboard_data::analysis::DashboardReport;
use dashboard_runtime::session::LoadStats;

use crate::metric::Metric;
use crate::table_view::row_cells;

const LABEL_WIDTH: usize = 24;
const COLUMN_WIDTH: usize = 11;

fn describe_selection(selection: &FilterSelection) -> (String, String) {
    let divisions = if selection.divisions.is_empty() {
        "all".to_string()
    } else {
        selection
            .divisions
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    let months = if selection.months.is_empty() {
        "all".to_string()
    } else {
        selection
            .months
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    (divisions, months)
}

/// Render `report` as a block of text.
pub fn render_summary(
    report: &DashboardReport,
    stats: &LoadStats,
    last_updated: Option<&str>,
    locale: Locale,
) -> String {
    let mut out = String::new();
    let meta = &report.metadata;
    let (divisions, months) = describe_selection(&meta.selection);

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "INVOICING DASHBOARD");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = write!(
        out,
        "Sources: {} | Records: {} of {} ({}%)",
        stats.sources,
        format_count(meta.records_filtered, locale),
        format_count(meta.records_total, locale),
        format_number(
            percentage(meta.records_filtered as f64, meta.records_total as f64, 1),
            1,
            locale
        )
    );
    if let Some(stamp) = last_updated {
        let _ = write!(out, " | Updated: {stamp}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Divisions: {divisions}");
    let _ = writeln!(out, "Months: {months}");
    let _ = writeln!(out);

    let _ = writeln!(out, "Totals");
    for metric in Metric::ALL {
        let _ = writeln!(
            out,
            "  {:<w$}{:>c$}",
            metric.label(),
            format_count(metric.count(&report.totals), locale),
            w = LABEL_WIDTH,
            c = COLUMN_WIDTH
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Ratios");
    let ratios = [
        ("Invoices per client", report.ratios.invoices_per_client),
        ("Invoices per contract", report.ratios.invoices_per_contract),
        ("Clients per project", report.ratios.clients_per_project),
    ];
    for (label, value) in ratios {
        let _ = writeln!(
            out,
            "  {:<w$}{:>c$}",
            label,
            format_ratio(value, locale),
            w = LABEL_WIDTH,
            c = COLUMN_WIDTH
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Monthly average");
    for metric in Metric::ALL {
        let _ = writeln!(
            out,
            "  {:<w$}{:>c$}",
            metric.label(),
            format_ratio(metric.average(&report.monthly_averages), locale),
            w = LABEL_WIDTH,
            c = COLUMN_WIDTH
        );
    }
    let _ = writeln!(out);

    if report.monthly.is_empty() {
        let _ = writeln!(out, "No records match the current selection.");
        return out;
    }

    let _ = write!(out, "{:<10}", "Month");
    for metric in Metric::ALL {
        let _ = write!(out, "{:>c$}", metric.label(), c = COLUMN_WIDTH);
    }
    let _ = writeln!(out);
    for row in &report.monthly {
        let cells = row_cells(&row.month.to_string(), &row.counts, locale);
        let _ = write!(out, "{:<10}", cells[0]);
        for cell in &cells[1..] {
            let _ = write!(out, "{:>c$}", cell, c = COLUMN_WIDTH);
        }
        let _ = writeln!(out);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{MonthBucket, Record};
    use dashboard_data::analysis::build_report;

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

    fn records() -> Vec<Record> {
        vec![
            rec("2024-01-05", "A", "1", "10", "100", "1000"),
            rec("2024-01-20", "A", "2", "10", "100", "1000"),
            rec("2024-02-01", "B", "3", "11", "101", "1001"),
        ]
    }

    fn stats() -> LoadStats {
        LoadStats {
            sources: 1,
            records: 3,
            ..LoadStats::default()
        }
    }

    #[test]
    fn test_summary_contains_all_sections() {
        let report = build_report(&records(), &FilterSelection::all());
        let text = render_summary(&report, &stats(), Some("10/05/2024 12:30"), Locale::PtBr);

        assert!(text.contains("Records: 3 of 3"));
        assert!(text.contains("Updated: 10/05/2024 12:30"));
        assert!(text.contains("Divisions: all"));
        assert!(text.contains("Invoices per client"));
        assert!(text.contains("1,50"));
        assert!(text.contains("2024-01"));
        assert!(text.contains("2024-02"));
    }

    #[test]
    fn test_summary_without_stamp_and_with_selection() {
        let sel = FilterSelection::new(vec!["B".to_string()], vec![MonthBucket::new(2024, 2).unwrap()]);
        let report = build_report(&records(), &sel);
        let text = render_summary(&report, &stats(), None, Locale::EnUs);

        assert!(!text.contains("Updated"));
        assert!(text.contains("Divisions: B"));
        assert!(text.contains("Months: 2024-02"));
        assert!(text.contains("Records: 1 of 3 (33.3%)"));
        assert!(!text.contains("2024-01 "));
    }

    #[test]
    fn test_summary_empty_selection_result() {
        let sel = FilterSelection::new(vec!["Z".to_string()], vec![]);
        let report = build_report(&records(), &sel);
        let text = render_summary(&report, &stats(), None, Locale::PtBr);
        assert!(text.contains("No records match"));
        assert!(text.contains("0,00"));
    }
}
