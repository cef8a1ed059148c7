//! Control Panel Widget
//! Left side panel: data source, load status and export controls.

use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Left side panel with data source info, status and exports.
pub struct ControlPanel {
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub record_count: Option<u64>,
    pub status: String,
    pub is_busy: bool,
    /// Titles of the charts that can be exported as images.
    pub chart_titles: Vec<&'static str>,
    pub selected_chart: usize,
    pub table_available: bool,
}

impl ControlPanel {
    pub fn new(csv_path: PathBuf, db_path: PathBuf) -> Self {
        Self {
            csv_path,
            db_path,
            record_count: None,
            status: "Ready".to_string(),
            is_busy: false,
            chart_titles: Vec::new(),
            selected_chart: 0,
            table_available: false,
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    pub fn set_charts(&mut self, titles: Vec<&'static str>) {
        self.chart_titles = titles;
        self.selected_chart = 0;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🍔 Food Insights")
                    .size(22.0)
                    .color(Color32::from_rgb(230, 81, 0)),
            );
            ui.label(
                RichText::new("Online Food Delivery Analysis")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("data_source")
                    .num_columns(2)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("CSV:").size(12.0));
                        ui.label(RichText::new(file_name(&self.csv_path)).size(12.0))
                            .on_hover_text(self.csv_path.display().to_string());
                        ui.end_row();

                        ui.label(RichText::new("Database:").size(12.0));
                        ui.label(RichText::new(file_name(&self.db_path)).size(12.0))
                            .on_hover_text(self.db_path.display().to_string());
                        ui.end_row();

                        ui.label(RichText::new("Records:").size(12.0));
                        let count = self
                            .record_count
                            .map_or_else(|| "-".to_string(), |c| c.to_string());
                        ui.label(RichText::new(count).size(12.0).strong());
                        ui.end_row();
                    });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(RichText::new("💾 Export").size(14.0).strong());
        ui.add_space(5.0);

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.table_available && !self.is_busy, |ui| {
                let button = egui::Button::new(RichText::new("📄 Table to CSV").size(14.0))
                    .min_size(egui::vec2(200.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCsv;
                }
            });
        });

        ui.add_space(8.0);

        if self.chart_titles.len() > 1 {
            ComboBox::from_id_salt("export_chart")
                .width(240.0)
                .selected_text(self.chart_titles[self.selected_chart.min(self.chart_titles.len() - 1)])
                .show_ui(ui, |ui| {
                    for (i, title) in self.chart_titles.iter().enumerate() {
                        ui.selectable_value(&mut self.selected_chart, i, *title);
                    }
                });
            ui.add_space(5.0);
        }

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.chart_titles.is_empty() && !self.is_busy, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Chart to PNG").size(14.0))
                    .min_size(egui::vec2(200.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng(self.selected_chart);
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.is_busy {
            Color32::GRAY
        } else {
            Color32::from_rgb(40, 167, 69)
        };
        ui.horizontal_wrapped(|ui| {
            if self.is_busy {
                ui.spinner();
            }
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        action
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    ExportCsv,
    /// Index into the current topic's charts.
    ExportPng(usize),
}
