use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::formatting::Locale;
use crate::models::MonthBucket;

/// Spreadsheet loaded when no `--source` is given.
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/rodneic/relatorio_faturamento/main/DADOSZSD065.XLSX";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Invoicing dashboard: distinct invoice, contract, client and project counts
/// by month and division
#[derive(Parser, Debug, Clone)]
#[command(
    name = "billing-dashboard",
    about = "Invoicing dashboard: distinct invoice, contract, client and project counts by month and division",
    version
)]
pub struct Settings {
    /// Spreadsheet source (URL, file or directory); repeat to concatenate
    #[arg(long = "source", value_name = "URL|PATH")]
    pub sources: Vec<String>,

    /// Restrict to a division; repeat for several
    #[arg(long = "division", value_name = "NAME")]
    pub divisions: Vec<String>,

    /// Restrict to a month (YYYY-MM); repeat for several
    #[arg(long = "month", value_name = "YYYY-MM", value_parser = parse_month)]
    pub months: Vec<MonthBucket>,

    /// Output view
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "summary", "json"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Number formatting locale
    #[arg(long, default_value = "pt-BR")]
    pub locale: Locale,

    /// Timezone for the last-updated stamp (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Seconds a downloaded source stays cached
    #[arg(long, default_value = "600")]
    pub cache_ttl: u64,

    /// GitHub repository (owner/repo) queried for the last-updated stamp
    #[arg(long)]
    pub github_repo: Option<String>,

    /// Repository path whose latest commit is reported; repeat for several
    #[arg(long = "tracked-path", value_name = "PATH")]
    pub tracked_paths: Vec<String>,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Skip the GitHub last-updated lookup
    #[arg(long)]
    pub no_commit_lookup: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

fn parse_month(s: &str) -> Result<MonthBucket, String> {
    s.parse::<MonthBucket>().map_err(|e| e.to_string())
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.billing-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".billing-dashboard").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear saved configuration");
            }
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins.  Division and month filters are never persisted.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "locale") {
            if let Some(v) = last.locale {
                settings.locale = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "cache_ttl") {
            if let Some(v) = last.cache_ttl {
                settings.cache_ttl = v;
            }
        }
        if settings.sources.is_empty() {
            if let Some(v) = last.sources {
                settings.sources = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::warn!(error = %e, "could not persist last-used configuration");
        }

        settings
    }

    /// Sources to load; falls back to [`DEFAULT_SOURCE`].
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![DEFAULT_SOURCE.to_string()]
        } else {
            self.sources.clone()
        }
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            locale: Some(s.locale),
            timezone: Some(s.timezone.clone()),
            view: Some(s.view.clone()),
            cache_ttl: Some(s.cache_ttl),
            sources: (!s.sources.is_empty()).then(|| s.sources.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            locale: Some(Locale::EnUs),
            timezone: Some("America/Sao_Paulo".to_string()),
            view: Some("summary".to_string()),
            cache_ttl: Some(60),
            sources: Some(vec!["/data/a.xlsx".to_string()]),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme, Some("dark".to_string()));
        assert_eq!(loaded.locale, Some(Locale::EnUs));
        assert_eq!(loaded.timezone, Some("America/Sao_Paulo".to_string()));
        assert_eq!(loaded.view, Some("summary".to_string()));
        assert_eq!(loaded.cache_ttl, Some(60));
        assert_eq!(loaded.sources, Some(vec!["/data/a.xlsx".to_string()]));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.theme.is_none());
        assert!(loaded.locale.is_none());
        assert!(loaded.sources.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["billing-dashboard"]);

        assert!(settings.sources.is_empty());
        assert!(settings.divisions.is_empty());
        assert!(settings.months.is_empty());
        assert_eq!(settings.view, "dashboard");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.locale, Locale::PtBr);
        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.cache_ttl, 600);
        assert!(settings.github_repo.is_none());
        assert!(settings.tracked_paths.is_empty());
        assert!(!settings.no_commit_lookup);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_repeated_filters() {
        let settings = Settings::parse_from([
            "billing-dashboard",
            "--division",
            "A",
            "--division",
            "B",
            "--month",
            "2024-01",
            "--month",
            "2024-02",
        ]);
        assert_eq!(settings.divisions, vec!["A", "B"]);
        assert_eq!(
            settings.months,
            vec![
                MonthBucket::new(2024, 1).unwrap(),
                MonthBucket::new(2024, 2).unwrap()
            ]
        );
    }

    #[test]
    fn test_settings_rejects_bad_month() {
        let result = Settings::try_parse_from(["billing-dashboard", "--month", "jan/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_locale_flag() {
        let settings = Settings::parse_from(["billing-dashboard", "--locale", "en-US"]);
        assert_eq!(settings.locale, Locale::EnUs);
    }

    #[test]
    fn test_effective_sources_defaults() {
        let settings = Settings::parse_from(["billing-dashboard"]);
        assert_eq!(settings.effective_sources(), vec![DEFAULT_SOURCE.to_string()]);

        let settings = Settings::parse_from(["billing-dashboard", "--source", "a.csv"]);
        assert_eq!(settings.effective_sources(), vec!["a.csv".to_string()]);
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            locale: Some(Locale::EnUs),
            timezone: Some("UTC".to_string()),
            sources: Some(vec!["saved.xlsx".to_string()]),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["billing-dashboard".into()], &config_path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.locale, Locale::EnUs);
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.sources, vec!["saved.xlsx".to_string()]);
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            timezone: Some("UTC".to_string()),
            sources: Some(vec!["saved.xlsx".to_string()]),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec![
                "billing-dashboard".into(),
                "--theme".into(),
                "light".into(),
                "--source".into(),
                "cli.csv".into(),
            ],
            &config_path,
        );
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.sources, vec!["cli.csv".to_string()]);
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(
            vec!["billing-dashboard".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["billing-dashboard".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_filters_not_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::load_with_last_used_impl(
            vec![
                "billing-dashboard".into(),
                "--division".into(),
                "A".into(),
                "--timezone".into(),
                "UTC".into(),
            ],
            &config_path,
        );

        let settings =
            Settings::load_with_last_used_impl(vec!["billing-dashboard".into()], &config_path);
        assert!(settings.divisions.is_empty());
        assert_eq!(settings.timezone, "UTC");
    }
}
