//! GUI module - Dashboard pages and widgets

mod app;
mod chart_viewer;
mod control_panel;
pub mod nav;
pub mod pages;

pub use app::DashboardApp;
pub use chart_viewer::{ChartViewer, TopicResult};
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use nav::{NavEvent, Page};
