mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result, anyhow};
use app::OutcomesApp;
use clap::Parser;
use eframe::egui;

use config::{Cli, DashboardConfig};
use data::aggregate::Summary;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut state = AppState::new(DashboardConfig::from(&cli));

    // An unreadable startup dataset is fatal: no window, no partial dashboard.
    if let Some(path) = &cli.dataset {
        state
            .open(path)
            .with_context(|| format!("loading {}", path.display()))?;
    }

    if cli.summary {
        return print_summary(&state);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Graduate Outcomes Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(OutcomesApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard: {e}"))
}

/// Headless mode: summary of the whole dataset as JSON on stdout.
fn print_summary(state: &AppState) -> Result<()> {
    let dataset = state
        .dataset
        .as_ref()
        .context("--summary needs a dataset")?;
    let summary = Summary::compute(dataset);
    let json = serde_json::to_string_pretty(&summary).context("serializing summary")?;
    println!("{json}");
    Ok(())
}
