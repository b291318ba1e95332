//! Data layer for the billing dashboard.
//!
//! Decodes spreadsheet sources into records, normalizes document dates into
//! month buckets, filters, aggregates distinct counts and builds the
//! [`analysis::DashboardReport`] consumed by the UI.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod merge;
pub mod metrics;
pub mod reader;
pub mod temporal;

pub use dashboard_core as core;
