//! The four count columns shown across tiles, bars and tables.

use dashboard_core::models::DistinctCounts;
use dashboard_data::metrics::MonthlyAverages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Invoices,
    Contracts,
    Clients,
    Projects,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Invoices,
        Metric::Contracts,
        Metric::Clients,
        Metric::Projects,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Invoices => "Invoices",
            Metric::Contracts => "Contracts",
            Metric::Clients => "Clients",
            Metric::Projects => "Projects",
        }
    }

    pub fn count(self, counts: &DistinctCounts) -> usize {
        match self {
            Metric::Invoices => counts.invoices,
            Metric::Contracts => counts.contracts,
            Metric::Clients => counts.clients,
            Metric::Projects => counts.projects,
        }
    }

    pub fn average(self, averages: &MonthlyAverages) -> f64 {
        match self {
            Metric::Invoices => averages.invoices,
            Metric::Contracts => averages.contracts,
            Metric::Clients => averages.clients,
            Metric::Projects => averages.projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_and_average_pick_matching_field() {
        let counts = DistinctCounts {
            invoices: 1,
            contracts: 2,
            clients: 3,
            projects: 4,
        };
        let averages = MonthlyAverages {
            invoices: 0.5,
            contracts: 1.0,
            clients: 1.5,
            projects: 2.0,
        };
        let got: Vec<usize> = Metric::ALL.iter().map(|m| m.count(&counts)).collect();
        assert_eq!(got, vec![1, 2, 3, 4]);
        assert_eq!(Metric::Projects.average(&averages), 2.0);
        assert_eq!(Metric::Clients.label(), "Clients");
    }
}
