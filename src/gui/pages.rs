//! Page renderers: home, analysis menu and section pages. Each takes the
//! data it shows and reports what the user asked for.

use super::nav::NavEvent;
use super::ChartViewer;
use crate::catalog::{Section, Topic};
use crate::stats::{ColumnSummary, StatsCalculator};
use crate::store::{OrderStore, QueryTable, StoreError, TABLE_NAME};
use egui::{Color32, ComboBox, RichText};

/// Numeric columns summarized on the home page.
pub const SUMMARY_COLUMNS: [&str; 6] = [
    "order_value",
    "final_amount",
    "delivery_time_min",
    "distance_km",
    "delivery_rating",
    "profit_margin_percent",
];

const ACCENT: Color32 = Color32::from_rgb(230, 81, 0);

/// What a page asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageAction {
    None,
    Navigate(NavEvent),
    SelectTopic(Option<&'static Topic>),
}

/// Everything the home page shows.
pub struct HomeData {
    pub table: QueryTable,
    pub total: u64,
    pub summaries: Vec<ColumnSummary>,
}

impl HomeData {
    pub fn load(store: &OrderStore) -> Result<Self, StoreError> {
        let table = store.query(&format!("SELECT * FROM {TABLE_NAME}"))?;
        let total = store.count()?;
        let summaries = SUMMARY_COLUMNS
            .iter()
            .filter_map(|column| {
                table
                    .numbers(column)
                    .map(|values| StatsCalculator::summarize(column, &values))
            })
            .collect();
        Ok(Self {
            table,
            total,
            summaries,
        })
    }
}

/// Per-section page state; rebuilt whenever the section is entered.
pub struct SectionState {
    pub section: Section,
    pub overview: Option<QueryTable>,
    pub selected: Option<&'static Topic>,
}

impl SectionState {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            overview: None,
            selected: None,
        }
    }
}

fn page_title(ui: &mut egui::Ui, title: &str) {
    ui.add_space(5.0);
    ui.label(RichText::new(title).size(24.0).strong().color(ACCENT));
    ui.add_space(8.0);
}

fn fmt_stat(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{value:.2}")
    }
}

pub fn show_home(ui: &mut egui::Ui, home: Option<&HomeData>, status: &str) -> PageAction {
    let mut action = PageAction::None;
    page_title(ui, "🍔 Online Food Delivery Analysis");

    let Some(home) = home else {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new(status).color(Color32::GRAY));
        });
        return action;
    };

    ui.label(RichText::new(status).size(12.0).color(Color32::from_rgb(40, 167, 69)));
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        ui.label(RichText::new("📊 Food Order Details").size(16.0).strong());
        ui.add_space(10.0);
        ui.label(
            RichText::new(format!("Total records: {}", home.total))
                .size(13.0)
                .color(Color32::GRAY),
        );
    });
    ChartViewer::draw_table(ui, "home_table", &home.table, 260.0);

    ui.add_space(12.0);
    ui.label(RichText::new("📈 Dataset Summary").size(16.0).strong());
    ui.add_space(4.0);
    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(5.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            egui::Grid::new("dataset_summary")
                .striped(true)
                .min_col_width(80.0)
                .spacing([10.0, 4.0])
                .show(ui, |ui| {
                    for header in ["Column", "Count", "Mean", "Std Dev", "Min", "Max"] {
                        ui.label(RichText::new(header).strong().size(12.0));
                    }
                    ui.end_row();

                    for s in &home.summaries {
                        ui.label(RichText::new(&s.column).size(12.0));
                        ui.label(RichText::new(s.count.to_string()).size(12.0));
                        ui.label(RichText::new(fmt_stat(s.mean)).size(12.0));
                        ui.label(RichText::new(fmt_stat(s.std_dev)).size(12.0));
                        ui.label(RichText::new(fmt_stat(s.min)).size(12.0));
                        ui.label(RichText::new(fmt_stat(s.max)).size(12.0));
                        ui.end_row();
                    }
                });
        });

    ui.add_space(15.0);
    let button = egui::Button::new(RichText::new("▶ Go to Analysis").size(16.0))
        .min_size(egui::vec2(200.0, 35.0));
    if ui.add(button).clicked() {
        action = PageAction::Navigate(NavEvent::OpenAnalysis);
    }
    action
}

pub fn show_analysis_menu(ui: &mut egui::Ui) -> PageAction {
    let mut action = PageAction::None;
    page_title(ui, "📊 Analysis");
    ui.label(RichText::new("Choose an area to explore").color(Color32::GRAY));
    ui.add_space(12.0);

    for section in Section::ALL {
        let def = section.definition();
        let button = egui::Button::new(
            RichText::new(format!("{} {}", def.icon, def.title)).size(15.0),
        )
        .min_size(egui::vec2(320.0, 36.0));
        if ui.add(button).clicked() {
            action = PageAction::Navigate(NavEvent::OpenSection(section));
        }
        ui.add_space(6.0);
    }

    ui.add_space(15.0);
    if ui.button("⬅ Back to Home").clicked() {
        action = PageAction::Navigate(NavEvent::BackToHome);
    }
    action
}

pub fn show_section(ui: &mut egui::Ui, state: &SectionState, viewer: &ChartViewer) -> PageAction {
    let mut action = PageAction::None;
    let def = state.section.definition();

    if ui.button("⬅ Back to Analysis").clicked() {
        action = PageAction::Navigate(NavEvent::BackToAnalysis);
    }
    page_title(ui, &format!("{} {}", def.icon, def.title));

    ui.horizontal(|ui| {
        ui.label("Select analysis:");
        let selected_text = state.selected.map_or("-- Select --", |t| t.label);
        ComboBox::from_id_salt(("topic", def.title))
            .width(320.0)
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(state.selected.is_none(), "-- Select --")
                    .clicked()
                    && state.selected.is_some()
                {
                    action = PageAction::SelectTopic(None);
                }
                for topic in def.topics {
                    let is_selected = state.selected.is_some_and(|t| t.key == topic.key);
                    if ui.selectable_label(is_selected, topic.label).clicked() && !is_selected {
                        action = PageAction::SelectTopic(Some(topic));
                    }
                }
            });
    });
    ui.add_space(10.0);

    match (state.selected, &state.overview) {
        (Some(_), _) => viewer.show(ui),
        (None, Some(overview)) => {
            ui.label(RichText::new("Overview").size(16.0).strong());
            ChartViewer::draw_table(ui, def.title, overview, 360.0);
        }
        (None, None) => {
            ui.label(RichText::new("No overview available").italics().weak());
        }
    }
    action
}
