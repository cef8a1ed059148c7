//! Chart Viewer Widget
//! Shows a query result: a virtualized table, the topic's charts side by
//! side and the insight line underneath.

use crate::catalog::Topic;
use crate::charts::{ChartError, ChartPlotter, ChartSeries};
use crate::store::QueryTable;
use egui::{Color32, RichText, ScrollArea};

const CELL_WIDTH: f32 = 130.0;
const ROW_HEIGHT: f32 = 20.0;
const CHART_HEIGHT: f32 = 320.0;
const CHART_SPACING: f32 = 15.0;

/// Result of the currently selected topic, kept for redraws.
pub struct TopicResult {
    pub topic: &'static Topic,
    pub table: QueryTable,
    pub series: Vec<Result<ChartSeries, ChartError>>,
}

impl TopicResult {
    pub fn new(topic: &'static Topic, table: QueryTable) -> Self {
        let series = topic
            .charts
            .iter()
            .map(|spec| ChartSeries::from_table(&table, spec))
            .collect();
        Self {
            topic,
            table,
            series,
        }
    }
}

#[derive(Default)]
pub struct ChartViewer {
    result: Option<TopicResult>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.result = None;
    }

    pub fn set_result(&mut self, topic: &'static Topic, table: QueryTable) {
        self.result = Some(TopicResult::new(topic, table));
    }

    pub fn result(&self) -> Option<&TopicResult> {
        self.result.as_ref()
    }

    /// Draw the current topic. Nothing is drawn when no topic is selected.
    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(result) = &self.result else {
            return;
        };

        ui.label(RichText::new(result.topic.label).size(18.0).strong());
        ui.add_space(6.0);
        Self::draw_table(ui, result.topic.key, &result.table, 220.0);
        ui.add_space(CHART_SPACING);

        let count = result.series.len().max(1) as f32;
        let chart_width = (ui.available_width() - CHART_SPACING * (count - 1.0)) / count;
        ui.horizontal(|ui| {
            for (i, (spec, series)) in result
                .topic
                .charts
                .iter()
                .zip(&result.series)
                .enumerate()
            {
                ui.vertical(|ui| {
                    ui.set_width(chart_width);
                    match series {
                        Ok(series) => ChartPlotter::draw(
                            ui,
                            &format!("{}_{i}", result.topic.key),
                            spec,
                            series,
                            CHART_HEIGHT,
                        ),
                        Err(e) => {
                            ui.label(
                                RichText::new(format!("Chart error: {e}"))
                                    .color(Color32::from_rgb(220, 53, 69)),
                            );
                        }
                    }
                });
                if i + 1 < result.series.len() {
                    ui.add_space(CHART_SPACING);
                }
            }
        });

        ui.add_space(CHART_SPACING);
        egui::Frame::none()
            .fill(Color32::from_rgb(232, 244, 253))
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new(format!("💡 Insight: {}", result.topic.insight))
                        .size(13.0)
                        .color(Color32::from_rgb(20, 60, 110)),
                );
            });
    }

    /// Header plus virtualized rows; only visible rows are laid out.
    pub fn draw_table(ui: &mut egui::Ui, id: &str, table: &QueryTable, height: f32) {
        ui.label(
            RichText::new(format!("{} rows", table.len()))
                .size(11.0)
                .color(Color32::GRAY),
        );

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(6.0)
            .show(ui, |ui| {
                ScrollArea::horizontal()
                    .id_salt(format!("{id}_hscroll"))
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            ui.horizontal(|ui| {
                                for column in &table.columns {
                                    ui.add_sized(
                                        [CELL_WIDTH, ROW_HEIGHT],
                                        egui::Label::new(RichText::new(column).strong().size(11.0))
                                            .truncate(),
                                    );
                                }
                            });
                            ui.separator();

                            ScrollArea::vertical()
                                .id_salt(format!("{id}_rows"))
                                .max_height(height)
                                .auto_shrink([false, true])
                                .show_rows(ui, ROW_HEIGHT, table.len(), |ui, row_range| {
                                    for row in row_range {
                                        ui.horizontal(|ui| {
                                            for col in 0..table.columns.len() {
                                                ui.add_sized(
                                                    [CELL_WIDTH, ROW_HEIGHT],
                                                    egui::Label::new(
                                                        RichText::new(table.text(row, col))
                                                            .size(11.0),
                                                    )
                                                    .truncate(),
                                                );
                                            }
                                        });
                                    }
                                });
                        });
                    });
            });
    }
}
