//! Food Insights - Online Food Delivery Analysis
//!
//! Loads the order extract into SQLite on first start and opens the
//! analysis dashboard.

use anyhow::Context;
use eframe::egui;
use food_insights::config::AppConfig;
use food_insights::gui::DashboardApp;
use food_insights::logging;

const APP_TITLE: &str = "Online Food Delivery Analysis";

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging.level);
    tracing::info!(
        csv = %config.data.csv_path.display(),
        database = %config.database.path.display(),
        "starting"
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([1000.0, 650.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
