//! Shared types for the billing dashboard.
//!
//! Holds the record and aggregate models, the error type, locale-aware
//! number formatting, date utilities and the CLI settings layer used by the
//! other workspace crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
