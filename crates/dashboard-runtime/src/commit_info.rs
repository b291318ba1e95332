//! "Last updated" stamp from the GitHub commits API.
//!
//! For each tracked file the newest commit touching it is requested; the
//! most recent committer date among them is the dashboard's data timestamp.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::time_utils::format_local_timestamp;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::source::SourceLocation;

const GITHUB_API: &str = "https://api.github.com";

// ── Repository inference ──────────────────────────────────────────────────────

/// Repository and file path behind a raw GitHub URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileRef {
    /// `owner/repo`
    pub repo: String,
    pub path: String,
}

fn raw_url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^https?://raw\.githubusercontent\.com/([^/]+)/([^/]+)/(?:refs/heads/)?[^/]+/([^?#]+)",
        )
        .expect("valid raw-url regex")
    })
}

/// Parse `https://raw.githubusercontent.com/{owner}/{repo}/{branch}/{path}`.
pub fn parse_raw_url(url: &str) -> Option<RawFileRef> {
    let caps = raw_url_pattern().captures(url.trim())?;
    Some(RawFileRef {
        repo: format!("{}/{}", &caps[1], &caps[2]),
        path: caps[3].to_string(),
    })
}

/// First raw GitHub URL among `sources`.
pub fn infer_from_sources(sources: &[SourceLocation]) -> Option<RawFileRef> {
    sources.iter().find_map(|s| match s {
        SourceLocation::Url(url) => parse_raw_url(url),
        SourceLocation::Path(_) => None,
    })
}

// ── API payload ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<Signature>,
    author: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: DateTime<Utc>,
}

impl CommitEntry {
    fn date(&self) -> Option<DateTime<Utc>> {
        self.commit
            .committer
            .as_ref()
            .or(self.commit.author.as_ref())
            .map(|s| s.date)
    }
}

// ── CommitLookup ──────────────────────────────────────────────────────────────

/// Settings for one lookup target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLookupConfig {
    /// `owner/repo`
    pub repo: String,
    pub paths: Vec<String>,
    pub token: Option<String>,
}

pub struct CommitLookup {
    client: reqwest::Client,
    config: CommitLookupConfig,
}

impl CommitLookup {
    pub fn new(client: reqwest::Client, config: CommitLookupConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &CommitLookupConfig {
        &self.config
    }

    /// Newest commit date across all tracked paths, or `None` when none of
    /// them has history.
    pub async fn latest_commit(&self) -> Result<Option<DateTime<Utc>>> {
        let mut newest: Option<DateTime<Utc>> = None;
        for path in &self.config.paths {
            if let Some(date) = self.latest_for_path(path).await? {
                newest = newest.max(Some(date));
            }
        }
        Ok(newest)
    }

    /// Formatted stamp in `tz`.  Failures are logged and yield `None`.
    pub async fn last_updated(&self, tz: Tz) -> Option<String> {
        match self.latest_commit().await {
            Ok(Some(date)) => Some(format_local_timestamp(date, tz)),
            Ok(None) => {
                debug!("No commits found for {:?}", self.config.paths);
                None
            }
            Err(e) => {
                warn!("Commit lookup failed: {}", e);
                None
            }
        }
    }

    async fn latest_for_path(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        let url = format!("{}/repos/{}/commits", GITHUB_API, self.config.repo);
        let fetch_err = |e: reqwest::Error| DashboardError::Fetch {
            source_id: format!("{}:{}", self.config.repo, path),
            message: e.to_string(),
        };

        let mut request = self
            .client
            .get(&url)
            .query(&[("path", path), ("per_page", "1")])
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let entries: Vec<CommitEntry> = request
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?
            .json()
            .await
            .map_err(fetch_err)?;

        Ok(newest_date(&entries))
    }
}

fn newest_date(entries: &[CommitEntry]) -> Option<DateTime<Utc>> {
    entries.iter().filter_map(CommitEntry::date).max()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
