use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the billing dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote source could not be downloaded.
    #[error("Failed to fetch {source_id}: {message}")]
    Fetch { source_id: String, message: String },

    /// A spreadsheet or CSV document could not be parsed.
    #[error("Failed to parse spreadsheet {source_id}: {message}")]
    Spreadsheet { source_id: String, message: String },

    /// A required column is absent from the header row.
    #[error("Missing required column \"{column}\" in {source_id}")]
    MissingColumn { column: String, source_id: String },

    /// A document date could not be interpreted.
    #[error("Invalid document date in {source_id} at row {row}: {value}")]
    DateParse {
        source_id: String,
        row: usize,
        value: String,
    },

    /// A month filter value is not in `YYYY-MM` form.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// No source produced any record.
    #[error("No data loaded from {0}")]
    NoData(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
