//! Chart Plotter Module
//! Draws interactive charts: cartesian kinds with egui_plot, radial kinds
//! with the egui painter.

use super::{palette_rgb, ChartKind, ChartSeries, ChartSpec, SeriesPoint};
use egui::{Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Donut and sunburst hole, as a fraction of the outer radius.
const DONUT_HOLE: f32 = 0.45;
/// Sunburst inner ring radius, as a fraction of the outer radius.
const SUNBURST_INNER: f32 = 0.7;

/// Creates interactive charts for query results.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color(index: usize) -> Color32 {
        let (r, g, b) = palette_rgb(index);
        Color32::from_rgb(r, g, b)
    }

    /// Draw one chart with its title. `id` must be unique per visible chart.
    pub fn draw(ui: &mut egui::Ui, id: &str, spec: &ChartSpec, series: &ChartSeries, height: f32) {
        ui.label(RichText::new(spec.title).strong().size(14.0));

        if series.is_empty() {
            ui.label(RichText::new("No data to plot").italics().weak());
            return;
        }

        match spec.kind {
            ChartKind::Bar | ChartKind::Histogram => {
                Self::draw_bars(ui, id, spec, &series.points(), false, height)
            }
            ChartKind::HorizontalBar => {
                Self::draw_bars(ui, id, spec, &series.points(), true, height)
            }
            ChartKind::Line => Self::draw_line(ui, id, spec, &series.points(), false, height),
            ChartKind::Area => Self::draw_line(ui, id, spec, &series.points(), true, height),
            ChartKind::Pie | ChartKind::Donut | ChartKind::Sunburst => {
                Self::draw_radial(ui, id, spec, series, height)
            }
        }
    }

    /// Category axis formatter: integer marks map to labels, others are blank.
    fn category_formatter(
        labels: Vec<String>,
    ) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String {
        move |mark, _range| {
            let rounded = mark.value.round();
            if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
                return String::new();
            }
            labels.get(rounded as usize).cloned().unwrap_or_default()
        }
    }

    fn draw_bars(
        ui: &mut egui::Ui,
        id: &str,
        spec: &ChartSpec,
        points: &[SeriesPoint],
        horizontal: bool,
        height: f32,
    ) {
        let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
        let bars: Vec<Bar> = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Bar::new(i as f64, p.value)
                    .width(0.7)
                    .name(&p.label)
                    .fill(Self::color(i))
            })
            .collect();

        let mut chart = BarChart::new(bars).name(spec.value);
        if horizontal {
            chart = chart.horizontal();
        }

        let mut plot = Plot::new(id)
            .height(height)
            .allow_scroll(false)
            .allow_zoom(true)
            .allow_drag(true);
        plot = if horizontal {
            plot.x_axis_label(spec.value)
                .y_axis_label(spec.label)
                .y_axis_formatter(Self::category_formatter(labels))
        } else {
            plot.x_axis_label(spec.label)
                .y_axis_label(spec.value)
                .x_axis_formatter(Self::category_formatter(labels))
        };

        plot.show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
    }

    fn draw_line(
        ui: &mut egui::Ui,
        id: &str,
        spec: &ChartSpec,
        points: &[SeriesPoint],
        filled: bool,
        height: f32,
    ) {
        let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
        let coords: Vec<[f64; 2]> = points
            .iter()
            .enumerate()
            .map(|(i, p)| [i as f64, p.value])
            .collect();
        let color = Self::color(0);

        Plot::new(id)
            .height(height)
            .allow_scroll(false)
            .x_axis_label(spec.label)
            .y_axis_label(spec.value)
            .x_axis_formatter(Self::category_formatter(labels))
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                let mut line = Line::new(PlotPoints::from_iter(coords.iter().copied()))
                    .color(color)
                    .width(2.0)
                    .name(spec.value);
                if filled {
                    line = line.fill(0.0);
                }
                plot_ui.line(line);
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(coords.iter().copied()))
                        .radius(3.5)
                        .color(color),
                );
            });
    }

    /// Start and end angle of each slice, clockwise from twelve o'clock.
    /// Non-positive values get no slice.
    pub fn slice_angles(values: &[f64]) -> Vec<(f32, f32)> {
        let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
        let mut start = -FRAC_PI_2;
        values
            .iter()
            .map(|&v| {
                let sweep = if total > 0.0 && v > 0.0 {
                    (v / total) as f32 * TAU
                } else {
                    0.0
                };
                let slice = (start, start + sweep);
                start += sweep;
                slice
            })
            .collect()
    }

    /// Filled wedge as convex polygons spanning at most a quarter turn each.
    fn wedge(center: Pos2, radius: f32, start: f32, end: f32, fill: Color32) -> Vec<Shape> {
        let sweep = end - start;
        if sweep <= 0.0 {
            return Vec::new();
        }
        let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / pieces as f32;

        (0..pieces)
            .map(|piece| {
                let a0 = start + step * piece as f32;
                let segments = ((step / 0.05).ceil() as usize).max(2);
                let mut points = Vec::with_capacity(segments + 2);
                points.push(center);
                for s in 0..=segments {
                    let angle = a0 + step * s as f32 / segments as f32;
                    points.push(center + radius * Vec2::angled(angle));
                }
                Shape::convex_polygon(points, fill, Stroke::new(1.0, Color32::WHITE))
            })
            .collect()
    }

    /// Index of the slice containing `angle`, measured like `slice_angles`.
    fn slice_at(slices: &[(f32, f32)], angle: f32) -> Option<usize> {
        let mut angle = angle;
        while angle < -FRAC_PI_2 {
            angle += TAU;
        }
        slices.iter().position(|(s, e)| angle >= *s && angle < *e)
    }

    fn draw_radial(
        ui: &mut egui::Ui,
        id: &str,
        spec: &ChartSpec,
        series: &ChartSeries,
        height: f32,
    ) {
        let points = series.points();

        ui.horizontal(|ui| {
            let size = Vec2::splat(height);
            let (response, painter) = ui.allocate_painter(size, Sense::hover());
            let rect = response.rect;
            let center = rect.center();
            let radius = rect.width().min(rect.height()) * 0.48;

            let outer_values: Vec<f64> = points.iter().map(|p| p.value).collect();
            let outer = Self::slice_angles(&outer_values);
            let mut hover_text = None;
            let hover = response
                .hover_pos()
                .map(|pos| (pos - center, (pos - center).length()));

            match series {
                ChartSeries::Nested(groups) if spec.kind == ChartKind::Sunburst => {
                    // Children fill the outer ring in parent order.
                    let mut child_labels = Vec::new();
                    let mut child_values = Vec::new();
                    let mut child_colors = Vec::new();
                    for (g, group) in groups.iter().enumerate() {
                        let base = Self::color(g);
                        for (c, child) in group.children.iter().enumerate() {
                            child_labels.push(format!("{} / {}", group.label, child.label));
                            child_values.push(child.value);
                            child_colors.push(base.gamma_multiply(if c % 2 == 0 { 0.75 } else { 0.55 }));
                        }
                    }
                    let children = Self::slice_angles(&child_values);
                    for ((s, e), color) in children.iter().zip(&child_colors) {
                        painter.extend(Self::wedge(center, radius, *s, *e, *color));
                    }
                    let inner_radius = radius * SUNBURST_INNER;
                    for (g, (s, e)) in outer.iter().enumerate() {
                        painter.extend(Self::wedge(center, inner_radius, *s, *e, Self::color(g)));
                    }
                    painter.circle_filled(center, radius * DONUT_HOLE * 0.6, ui.visuals().panel_fill);

                    if let Some((delta, dist)) = hover {
                        let angle = delta.y.atan2(delta.x);
                        if dist <= inner_radius {
                            hover_text = Self::slice_at(&outer, angle)
                                .map(|i| format!("{}: {:.2}", points[i].label, points[i].value));
                        } else if dist <= radius {
                            hover_text = Self::slice_at(&children, angle)
                                .map(|i| format!("{}: {:.2}", child_labels[i], child_values[i]));
                        }
                    }
                }
                _ => {
                    for (i, (s, e)) in outer.iter().enumerate() {
                        painter.extend(Self::wedge(center, radius, *s, *e, Self::color(i)));
                    }
                    let hole = if spec.kind == ChartKind::Donut {
                        radius * DONUT_HOLE
                    } else {
                        0.0
                    };
                    if hole > 0.0 {
                        painter.circle_filled(center, hole, ui.visuals().panel_fill);
                    }
                    if let Some((delta, dist)) = hover {
                        if dist >= hole && dist <= radius {
                            let angle = delta.y.atan2(delta.x);
                            hover_text = Self::slice_at(&outer, angle)
                                .map(|i| format!("{}: {:.2}", points[i].label, points[i].value));
                        }
                    }
                }
            }

            // Percent labels on slices wide enough to hold them.
            let total: f64 = outer_values.iter().filter(|v| **v > 0.0).sum();
            let label_radius = if spec.kind == ChartKind::Pie {
                radius * 0.65
            } else if spec.kind == ChartKind::Sunburst {
                radius * (SUNBURST_INNER + DONUT_HOLE * 0.6) / 2.0
            } else {
                radius * (1.0 + DONUT_HOLE) / 2.0
            };
            for (point, (s, e)) in points.iter().zip(&outer) {
                if e - s < 0.25 || total <= 0.0 {
                    continue;
                }
                let mid = (s + e) / 2.0;
                painter.text(
                    center + label_radius * Vec2::angled(mid),
                    Align2::CENTER_CENTER,
                    format!("{:.1}%", point.value / total * 100.0),
                    FontId::proportional(11.0),
                    Color32::WHITE,
                );
            }

            if let Some(text) = hover_text {
                response.on_hover_text_at_pointer(text);
            }

            Self::draw_legend(ui, id, &points);
        });
    }

    fn draw_legend(ui: &mut egui::Ui, id: &str, points: &[SeriesPoint]) {
        egui::ScrollArea::vertical()
            .id_salt((id, "legend"))
            .max_height(ui.available_height())
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    for (i, point) in points.iter().enumerate() {
                        ui.horizontal(|ui| {
                            let (rect, _) =
                                ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
                            ui.painter().rect_filled(rect, 2.0, Self::color(i));
                            ui.label(RichText::new(&point.label).size(11.0));
                        });
                    }
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_cover_a_full_turn() {
        let slices = ChartPlotter::slice_angles(&[1.0, 1.0, 2.0]);
        assert_eq!(slices.len(), 3);
        assert!((slices[0].0 + FRAC_PI_2).abs() < 1e-6);
        assert!((slices[2].1 - (TAU - FRAC_PI_2)).abs() < 1e-4);
        assert!(((slices[2].1 - slices[2].0) - TAU / 2.0).abs() < 1e-4);
    }

    #[test]
    fn non_positive_values_get_empty_slices() {
        let slices = ChartPlotter::slice_angles(&[0.0, -3.0, 5.0]);
        assert_eq!(slices[0].0, slices[0].1);
        assert_eq!(slices[1].0, slices[1].1);
        assert!(ChartPlotter::slice_angles(&[0.0, 0.0])
            .iter()
            .all(|(s, e)| s == e));
    }

    #[test]
    fn hover_angle_finds_slice() {
        let slices = ChartPlotter::slice_angles(&[1.0, 1.0, 1.0, 1.0]);
        // Twelve o'clock belongs to the first slice, nine o'clock to the last.
        assert_eq!(ChartPlotter::slice_at(&slices, -FRAC_PI_2), Some(0));
        assert_eq!(ChartPlotter::slice_at(&slices, 0.1), Some(1));
        assert_eq!(ChartPlotter::slice_at(&slices, -FRAC_PI_2 - 0.1), Some(3));
    }

    #[test]
    fn wedges_split_into_quarter_turns() {
        let full = ChartPlotter::wedge(Pos2::ZERO, 10.0, 0.0, TAU, Color32::RED);
        assert_eq!(full.len(), 4);
        assert!(ChartPlotter::wedge(Pos2::ZERO, 10.0, 1.0, 1.0, Color32::RED).is_empty());
    }

    #[test]
    fn category_formatter_only_labels_integers() {
        let format = ChartPlotter::category_formatter(vec!["Pune".into(), "Delhi".into()]);
        let mark = |value| egui_plot::GridMark {
            value,
            step_size: 1.0,
        };
        assert_eq!(format(mark(1.0), &(0.0..=1.0)), "Delhi");
        assert_eq!(format(mark(0.5), &(0.0..=1.0)), "");
        assert_eq!(format(mark(4.0), &(0.0..=1.0)), "");
        assert_eq!(format(mark(-1.0), &(0.0..=1.0)), "");
    }
}
