//! Food Insights Main Application
//! Main window: control panel on the left, the current page in the centre.

use crate::catalog::Topic;
use crate::charts::StaticChartRenderer;
use crate::config::AppConfig;
use crate::data::DataCleaner;
use crate::gui::nav::{NavEvent, Page};
use crate::gui::pages::{self, HomeData, PageAction, SectionState};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::ingest::{ensure_loaded, IngestOutcome};
use crate::store::{OrderStore, QueryTable};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

const PNG_SIZE: (u32, u32) = (1400, 900);

/// First-load result from the background thread
enum LoadResult {
    Progress(String),
    Complete {
        store: OrderStore,
        outcome: IngestOutcome,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: AppConfig,
    page: Page,
    store: Option<OrderStore>,
    home: Option<HomeData>,
    section: Option<SectionState>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    load_status: String,

    // Async first load
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(
                config.data.csv_path.clone(),
                config.database.path.clone(),
            ),
            config,
            page: Page::default(),
            store: None,
            home: None,
            section: None,
            chart_viewer: ChartViewer::new(),
            load_status: "Preparing data...".to_string(),
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Open the store and run the first-load gate in a background thread.
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        let csv_path = self.config.data.csv_path.clone();
        let db_path = self.config.database.path.clone();
        let cleaner = DataCleaner::new(self.config.cleaning.group_fallback);

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel.is_busy = true;
        self.control_panel.set_status("Opening database...");

        let spawned = thread::Builder::new()
            .name("ingest".to_string())
            .spawn(move || {
                let result = OrderStore::open(&db_path)
                    .map_err(anyhow::Error::from)
                    .and_then(|mut store| {
                        let progress_tx = tx.clone();
                        let outcome = ensure_loaded(&mut store, &csv_path, cleaner, |msg| {
                            let _ = progress_tx.send(LoadResult::Progress(msg.to_string()));
                        })?;
                        Ok((store, outcome))
                    });

                let message = match result {
                    Ok((store, outcome)) => LoadResult::Complete { store, outcome },
                    Err(e) => {
                        tracing::error!(error = %format!("{e:#}"), "first load failed");
                        LoadResult::Error(format!("{e:#}"))
                    }
                };
                let _ = tx.send(message);
            });

        if let Err(e) = spawned {
            tracing::error!(error = %e, "could not start loader thread");
            self.is_loading = false;
            self.control_panel.is_busy = false;
            self.load_rx = None;
            self.set_error(&format!("Could not start loader: {e}"));
        }
    }

    /// Check for first-load results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.load_status = status.clone();
                        self.control_panel.set_status(&status);
                    }
                    LoadResult::Complete { store, outcome } => {
                        self.on_store_ready(store, &outcome);
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        self.is_loading = false;
                        self.control_panel.is_busy = false;
                        self.load_status = format!("Error: {error}");
                        self.set_error(&error);
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn on_store_ready(&mut self, store: OrderStore, outcome: &IngestOutcome) {
        self.is_loading = false;
        self.control_panel.is_busy = false;

        self.load_status = match outcome {
            IngestOutcome::Inserted { rows, report } => {
                tracing::info!(
                    rows,
                    dropped = report.dropped(),
                    clipped = report.clipped_discounts,
                    "orders inserted"
                );
                format!("Data inserted successfully ({rows} rows)")
            }
            IngestOutcome::AlreadyPresent { rows } => {
                format!("Data already present in database ({rows} rows)")
            }
        };

        match HomeData::load(&store) {
            Ok(home) => {
                self.control_panel.record_count = Some(home.total);
                self.home = Some(home);
                self.control_panel.set_status(&self.load_status.clone());
            }
            Err(e) => {
                tracing::error!(error = %e, "could not read home table");
                self.set_error(&e.to_string());
            }
        }
        self.store = Some(store);
        self.refresh_exports();
    }

    fn set_error(&mut self, message: &str) {
        self.control_panel.set_status(&format!("Error: {message}"));
    }

    /// Apply a navigation event; entering a section resets its selection.
    fn navigate(&mut self, event: NavEvent) {
        let next = self.page.apply(event);
        if next == self.page {
            return;
        }
        tracing::debug!(from = ?self.page, to = ?next, "navigate");
        self.page = next;
        self.chart_viewer.clear();

        self.section = None;
        if let Page::Section(section) = next {
            let mut state = SectionState::new(section);
            let overview = self
                .store
                .as_ref()
                .map(|store| store.query(section.definition().overview_sql));
            match overview {
                Some(Ok(table)) => state.overview = Some(table),
                Some(Err(e)) => {
                    tracing::error!(error = %e, section = section.title(), "overview query failed");
                    self.set_error(&e.to_string());
                }
                None => {}
            }
            self.section = Some(state);
        }
        self.refresh_exports();
    }

    /// Run the newly selected topic's query once.
    fn select_topic(&mut self, topic: Option<&'static Topic>) {
        let Some(state) = self.section.as_mut() else {
            return;
        };
        state.selected = topic;
        self.chart_viewer.clear();

        if let Some(topic) = topic {
            let result = self.store.as_ref().map(|store| store.query(topic.sql));
            match result {
                Some(Ok(table)) => {
                    tracing::debug!(topic = topic.key, rows = table.len(), "topic query");
                    self.chart_viewer.set_result(topic, table);
                    self.control_panel.set_status(&self.load_status.clone());
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, topic = topic.key, "topic query failed");
                    self.set_error(&e.to_string());
                }
                None => {}
            }
        }
        self.refresh_exports();
    }

    /// Table currently on screen, with a file stem for exports.
    fn current_table(&self) -> Option<(&str, &QueryTable)> {
        match self.page {
            Page::Home => self.home.as_ref().map(|h| ("food_order_details", &h.table)),
            Page::Analysis => None,
            Page::Section(section) => {
                if let Some(result) = self.chart_viewer.result() {
                    Some((result.topic.key, &result.table))
                } else {
                    self.section
                        .as_ref()
                        .and_then(|s| s.overview.as_ref())
                        .map(|t| (section.definition().title, t))
                }
            }
        }
    }

    fn refresh_exports(&mut self) {
        self.control_panel.table_available = self.current_table().is_some();
        let titles = self
            .chart_viewer
            .result()
            .map(|r| r.topic.charts.iter().map(|c| c.title).collect())
            .unwrap_or_default();
        self.control_panel.set_charts(titles);
    }

    fn handle_export_csv(&mut self) {
        let Some((stem, table)) = self.current_table() else {
            self.control_panel.set_status("No table to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(format!("{}.csv", sanitize(stem)))
            .save_file()
        else {
            return;
        };

        let status = match table.export_csv(&path) {
            Ok(()) => format!("Exported {} rows to {}", table.len(), path.display()),
            Err(e) => {
                tracing::error!(error = %e, "csv export failed");
                format!("Error: {e}")
            }
        };
        self.control_panel.set_status(&status);
    }

    fn handle_export_png(&mut self, index: usize) {
        let Some(result) = self.chart_viewer.result() else {
            self.control_panel.set_status("No chart to export");
            return;
        };
        let Some(spec) = result.topic.charts.get(index) else {
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(format!("{}.png", sanitize(spec.title)))
            .save_file()
        else {
            return;
        };

        let status = match StaticChartRenderer::render_png(spec, &result.table, &path, PNG_SIZE) {
            Ok(()) => {
                if let Err(e) = open::that(&path) {
                    tracing::warn!(error = %e, "could not open exported image");
                }
                format!("Chart saved to {}", path.display())
            }
            Err(e) => {
                tracing::error!(error = %e, "png export failed");
                format!("Error: {e}")
            }
        };
        self.control_panel.set_status(&status);
    }

    fn csv_path(&self) -> &PathBuf {
        &self.config.data.csv_path
    }
}

/// File stem from a title: alphanumerics kept, everything else `_`.
fn sanitize(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let trimmed = stem.trim_matches('_');
    if trimmed.is_empty() {
        "export".to_string()
    } else {
        trimmed.to_string()
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::ExportCsv => self.handle_export_csv(),
                        ControlPanelAction::ExportPng(index) => self.handle_export_png(index),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - current page
        egui::CentralPanel::default().show(ctx, |ui| {
            let action = egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.page {
                    Page::Home => {
                        if self.home.is_none() && !self.is_loading {
                            ui.label(format!("Source: {}", self.csv_path().display()));
                        }
                        pages::show_home(ui, self.home.as_ref(), &self.load_status)
                    }
                    Page::Analysis => pages::show_analysis_menu(ui),
                    Page::Section(_) => match &self.section {
                        Some(state) => pages::show_section(ui, state, &self.chart_viewer),
                        None => PageAction::None,
                    },
                })
                .inner;

            match action {
                PageAction::Navigate(event) => self.navigate(event),
                PageAction::SelectTopic(topic) => self.select_topic(topic),
                PageAction::None => {}
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_builds_file_stems() {
        assert_eq!(sanitize("City vs Total Revenue"), "city_vs_total_revenue");
        assert_eq!(sanitize("Customer & Order Analysis"), "customer___order_analysis");
        assert_eq!(sanitize("***"), "export");
    }
}
