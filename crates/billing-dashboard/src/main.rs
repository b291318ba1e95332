mod bootstrap;

use anyhow::{Context, Result};
use serde::Serialize;

use dashboard_core::models::FilterSelection;
use dashboard_core::settings::Settings;
use dashboard_data::analysis::DashboardReport;
use dashboard_data::filter::FilterOptions;
use dashboard_runtime::config::DashboardConfig;
use dashboard_runtime::session::{DashboardSession, LoadStats, LoadedData};
use dashboard_ui::app::App;
use dashboard_ui::summary::render_summary;

/// Document printed by `--view json`.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: DashboardReport,
    load: &'a LoadStats,
    last_updated: Option<&'a str>,
    options: &'a FilterOptions,
}

fn json_output(data: &LoadedData, selection: &FilterSelection) -> Result<String> {
    let output = JsonOutput {
        report: data.report(selection),
        load: &data.stats,
        last_updated: data.last_updated.as_deref(),
        options: &data.options,
    };
    serde_json::to_string_pretty(&output).context("failed to serialize report")
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| (settings.view == "dashboard").then(bootstrap::default_log_file));
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("billing-dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Locale: {}",
        settings.view,
        settings.theme,
        settings.locale
    );

    let config = DashboardConfig::from_settings(&settings);
    let selection = config.initial_selection.clone();
    let locale = config.locale;
    let mut session = DashboardSession::new(config)?;

    match settings.view.as_str() {
        "dashboard" => {
            let app = App::new(&settings.theme, locale, selection);

            // The loop exits on 'q' / Ctrl+C inside the TUI.  Signals that
            // arrive while the terminal is in raw mode end it here.
            tokio::select! {
                result = app.run(session) => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }

        "summary" => {
            let data = session.load(false).await?;
            let report = data.report(&selection);
            print!(
                "{}",
                render_summary(&report, &data.stats, data.last_updated.as_deref(), locale)
            );
        }

        "json" => {
            let data = session.load(false).await?;
            println!("{}", json_output(&data, &selection)?);
        }

        unknown => anyhow::bail!("Unknown view: {}", unknown),
    }

    Ok(())
}
