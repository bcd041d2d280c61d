mod app;
mod color;
mod data;
mod error;
mod state;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use app::AirlineDashboardApp;
use clap::Parser;
use eframe::egui;

use data::aggregate::DashboardSummary;
use data::filter::{apply, FilterCriteria};
use data::loader::load_file;

#[derive(Parser)]
#[command(name = "airline-dashboard")]
#[command(about = "Explore airline booking demand: filters, charts and the raw table", long_about = None)]
struct Cli {
    /// Booking dataset to open at startup (.csv, .json or .parquet)
    path: Option<PathBuf>,

    /// Print the chart tables for the whole dataset as JSON and exit
    #[arg(long, requires = "path")]
    summary: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match (cli.summary, cli.path) {
        (true, Some(path)) => print_summary(&path),
        (_, path) => run_dashboard(path),
    }
}

/// Headless mode: default criteria (everything, observed date bounds).
fn print_summary(path: &Path) -> Result<()> {
    let dataset =
        load_file(path).with_context(|| format!("loading {}", path.display()))?;
    let criteria = FilterCriteria::all_of(&dataset);
    let rows = apply(&dataset.records, &criteria);
    let summary = DashboardSummary::compute(&rows);
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serializing summary")?
    );
    Ok(())
}

fn run_dashboard(path: Option<PathBuf>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Airline Booking Market Demand Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(AirlineDashboardApp::new(path.as_deref())))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}
