//! Runtime layer for the billing dashboard.
//!
//! Resolves configuration, fetches sources through a TTL cache, looks up
//! the last-updated stamp and runs the load pipeline for the UI.

pub mod commit_info;
pub mod config;
pub mod fetcher;
pub mod session;
pub mod source;
pub mod source_cache;

pub use dashboard_core as core;
pub use dashboard_data as data;
