//! Source locations: remote URLs or local paths.

use std::fmt;
use std::path::{Path, PathBuf};

use dashboard_data::reader::SourceFormat;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions picked up when a directory is given as a source.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "csv"];

/// Where a spreadsheet comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLocation {
    Url(String),
    Path(PathBuf),
}

impl SourceLocation {
    /// `http://` and `https://` strings are URLs, anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceLocation::Url(trimmed.to_string())
        } else {
            SourceLocation::Path(PathBuf::from(trimmed))
        }
    }

    /// Stable identifier, used as the cache key and in messages.
    pub fn id(&self) -> String {
        match self {
            SourceLocation::Url(url) => url.clone(),
            SourceLocation::Path(path) => path.display().to_string(),
        }
    }

    pub fn format(&self) -> SourceFormat {
        SourceFormat::from_name(&self.id())
    }

    pub fn is_url(&self) -> bool {
        matches!(self, SourceLocation::Url(_))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Parse configured source strings, expanding directories into the
/// spreadsheet files beneath them (sorted by path).
///
/// Paths that do not exist are kept as-is so the fetch reports them.
pub fn expand_sources(raw: &[String]) -> Vec<SourceLocation> {
    let mut out = Vec::new();
    for entry in raw {
        match SourceLocation::parse(entry) {
            SourceLocation::Path(path) if path.is_dir() => {
                let files = discover_spreadsheets(&path);
                if files.is_empty() {
                    warn!("No spreadsheet files found in {}", path.display());
                }
                out.extend(files.into_iter().map(SourceLocation::Path));
            }
            location => out.push(location),
        }
    }
    out
}

/// Every spreadsheet file under `dir`, recursively.
pub fn discover_spreadsheets(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_spreadsheet_extension(p))
        .collect();
    files.sort();
    debug!("Discovered {} spreadsheet(s) in {}", files.len(), dir.display());
    files
}

fn has_spreadsheet_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            SPREADSHEET_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}
