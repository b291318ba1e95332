//! Terminal UI layer for the invoicing dashboard.
//!
//! Provides themes, count bars, tiles, filter lists, the per-month charts
//! and table, a plain-text summary, and the main application event loop
//! built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod metric;
pub mod summary;
pub mod table_view;
pub mod themes;

pub use dashboard_core as core;
