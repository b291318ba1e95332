//! Load pipeline: fetch, decode, normalize, merge.
//!
//! A [`DashboardSession`] owns the source cache and the optional commit
//! lookup.  Each [`load`](DashboardSession::load) produces a [`LoadedData`]
//! holding the full record set; reports for any selection are then computed
//! from it without touching the network again.

use std::time::Instant;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{FilterSelection, Record};
use dashboard_data::analysis::{build_report, DashboardReport};
use dashboard_data::filter::FilterOptions;
use dashboard_data::merge::merge_sources;
use dashboard_data::reader::read_records;
use dashboard_data::temporal::normalize_records;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::commit_info::CommitLookup;
use crate::config::DashboardConfig;
use crate::fetcher::{HttpFetcher, SourceFetcher};
use crate::source_cache::SourceCache;

// ── Public types ──────────────────────────────────────────────────────────────

/// Counters gathered while loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadStats {
    pub sources: usize,
    /// Data rows decoded across all sources.
    pub rows_read: usize,
    pub skipped_blank_dates: usize,
    pub duplicates_removed: usize,
    /// Records kept after merging.
    pub records: usize,
    pub load_time_seconds: f64,
}

/// Everything one load produced.
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub records: Vec<Record>,
    pub options: FilterOptions,
    pub stats: LoadStats,
    /// Formatted time of the newest commit touching the tracked files.
    pub last_updated: Option<String>,
}

impl LoadedData {
    pub fn report(&self, selection: &FilterSelection) -> DashboardReport {
        build_report(&self.records, selection)
    }
}

// ── DashboardSession ──────────────────────────────────────────────────────────

pub struct DashboardSession<F> {
    config: DashboardConfig,
    cache: SourceCache<F>,
    commit_lookup: Option<CommitLookup>,
}

impl DashboardSession<HttpFetcher> {
    /// Session using HTTP/filesystem fetching.  The commit lookup shares
    /// the fetcher's HTTP client.
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new()?;
        let commit_lookup = config
            .commit_lookup
            .clone()
            .map(|c| CommitLookup::new(fetcher.client().clone(), c));
        Ok(Self::with_parts(config, fetcher, commit_lookup))
    }
}

impl<F: SourceFetcher> DashboardSession<F> {
    pub fn with_parts(
        config: DashboardConfig,
        fetcher: F,
        commit_lookup: Option<CommitLookup>,
    ) -> Self {
        let cache = SourceCache::new(fetcher, config.cache_ttl_secs);
        Self {
            config,
            cache,
            commit_lookup,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &SourceCache<F> {
        &self.cache
    }

    /// Load every configured source in order.
    ///
    /// Any fetch, decode or date error aborts the load.  The commit lookup
    /// runs afterwards and never fails the load.
    pub async fn load(&mut self, force_refresh: bool) -> Result<LoadedData> {
        if self.config.sources.is_empty() {
            return Err(DashboardError::NoData("no sources configured".to_string()));
        }

        let start = Instant::now();
        let mut stats = LoadStats {
            sources: self.config.sources.len(),
            ..LoadStats::default()
        };
        let mut batches = Vec::with_capacity(self.config.sources.len());

        for location in &self.config.sources {
            let id = location.id();
            let bytes = self.cache.get(location, force_refresh).await?;
            let raw = read_records(&id, location.format(), bytes, &self.config.columns)?;
            stats.rows_read += raw.len();

            let normalized = normalize_records(&id, raw)?;
            stats.skipped_blank_dates += normalized.skipped_blank_dates;
            batches.push(normalized.records);
        }

        let merged = merge_sources(batches);
        stats.duplicates_removed = merged.duplicates_removed;
        stats.records = merged.records.len();
        stats.load_time_seconds = start.elapsed().as_secs_f64();

        if merged.records.is_empty() {
            warn!("Sources loaded but produced no records");
        }
        info!(
            "Loaded {} record(s) from {} source(s) ({} duplicate(s) removed)",
            stats.records, stats.sources, stats.duplicates_removed
        );

        let last_updated = match &self.commit_lookup {
            Some(lookup) => lookup.last_updated(self.config.timezone).await,
            None => None,
        };

        Ok(LoadedData {
            options: FilterOptions::from_records(&merged.records),
            records: merged.records,
            stats,
            last_updated,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
