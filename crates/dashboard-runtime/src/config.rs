//! Resolved runtime configuration.

use chrono_tz::Tz;
use dashboard_core::formatting::Locale;
use dashboard_core::models::{ColumnMapping, FilterSelection};
use dashboard_core::settings::Settings;
use dashboard_core::time_utils::resolve_timezone;
use tracing::debug;

use crate::commit_info::{infer_from_sources, CommitLookupConfig};
use crate::source::{expand_sources, SourceLocation};

/// Everything the load step needs, with CLI sentinels already resolved.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub sources: Vec<SourceLocation>,
    pub columns: ColumnMapping,
    pub cache_ttl_secs: u64,
    pub timezone: Tz,
    pub locale: Locale,
    /// Selection seeded from `--division` / `--month`.
    pub initial_selection: FilterSelection,
    /// `None` disables the last-updated lookup.
    pub commit_lookup: Option<CommitLookupConfig>,
}

impl DashboardConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let sources = expand_sources(&settings.effective_sources());
        let commit_lookup = if settings.no_commit_lookup {
            None
        } else {
            resolve_commit_lookup(settings, &sources)
        };
        debug!(
            sources = sources.len(),
            commit_lookup = commit_lookup.is_some(),
            "dashboard configuration resolved"
        );

        Self {
            sources,
            columns: ColumnMapping::default(),
            cache_ttl_secs: settings.cache_ttl,
            timezone: resolve_timezone(&settings.timezone),
            locale: settings.locale,
            initial_selection: FilterSelection::new(
                settings.divisions.iter().cloned(),
                settings.months.iter().copied(),
            ),
            commit_lookup,
        }
    }
}

/// An explicit `--github-repo` wins; its paths default to the file of the
/// first raw URL from the same repository.  Without one, the repository is
/// inferred from the first raw GitHub source.
fn resolve_commit_lookup(
    settings: &Settings,
    sources: &[SourceLocation],
) -> Option<CommitLookupConfig> {
    let inferred = infer_from_sources(sources);

    let (repo, mut paths) = match (&settings.github_repo, inferred) {
        (Some(repo), Some(raw)) if raw.repo.eq_ignore_ascii_case(repo) => {
            (repo.clone(), vec![raw.path])
        }
        (Some(repo), _) => (repo.clone(), Vec::new()),
        (None, Some(raw)) => (raw.repo, vec![raw.path]),
        (None, None) => return None,
    };

    if !settings.tracked_paths.is_empty() {
        paths = settings.tracked_paths.clone();
    }
    if paths.is_empty() {
        debug!("no tracked paths for {}; skipping commit lookup", repo);
        return None;
    }

    Some(CommitLookupConfig {
        repo,
        paths,
        token: settings.github_token.clone(),
    })
}
