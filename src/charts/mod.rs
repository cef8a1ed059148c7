//! Charts module - Chart descriptions and rendering

mod plotter;
mod renderer;
mod spec;

pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};
pub use spec::{ChartError, ChartKind, ChartSeries, ChartSpec, RingGroup, SeriesPoint};

/// Series colors shared by the interactive and static renderers.
pub const PALETTE_RGB: [(u8, u8, u8); 10] = [
    (52, 152, 219),  // Blue
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (255, 87, 34),   // Deep Orange
    (96, 125, 139),  // Blue Grey
];

pub fn palette_rgb(index: usize) -> (u8, u8, u8) {
    PALETTE_RGB[index % PALETTE_RGB.len()]
}
