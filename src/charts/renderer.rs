//! Static Chart Renderer
//! Writes the chart currently on screen to a PNG file with plotters.
//!
//! Layout follows the interactive chart: bars on a segmented category
//! axis, lines and areas over the row index, pies and donuts with percent
//! labels, and sunbursts as a parent pie inside a ring of children.

use super::{palette_rgb, ChartError, ChartKind, ChartSeries, ChartSpec, SeriesPoint};
use crate::store::QueryTable;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Nothing to draw for '{0}'")]
    Empty(&'static str),
    #[error("Drawing failed: {0}")]
    Drawing(String),
}

fn drawing_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

fn color(index: usize) -> RGBColor {
    let (r, g, b) = palette_rgb(index);
    RGBColor(r, g, b)
}

/// Axis range covering zero and every value, with headroom above the top.
pub fn value_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(0.0_f64, f64::min);
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return (min, min + 1.0);
    }
    let pad = (max - min) * 0.1;
    (if min < 0.0 { min - pad } else { min }, max + pad)
}

fn category_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render `spec` over `table` into a PNG at `path`.
    pub fn render_png(
        spec: &ChartSpec,
        table: &QueryTable,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let series = ChartSeries::from_table(table, spec)?;
        if series.is_empty() {
            return Err(RenderError::Empty(spec.title));
        }

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        match spec.kind {
            ChartKind::Bar | ChartKind::Histogram => {
                Self::draw_bars(&root, spec, &series.points(), false)?
            }
            ChartKind::HorizontalBar => Self::draw_bars(&root, spec, &series.points(), true)?,
            ChartKind::Line => Self::draw_line(&root, spec, &series.points(), false)?,
            ChartKind::Area => Self::draw_line(&root, spec, &series.points(), true)?,
            ChartKind::Pie | ChartKind::Donut | ChartKind::Sunburst => {
                Self::draw_radial(&root, spec, &series)?
            }
        }

        root.present().map_err(drawing_error)?;
        tracing::info!(path = %path.display(), chart = spec.title, "chart image written");
        Ok(())
    }

    fn draw_bars(
        root: &DrawingArea<BitMapBackend, Shift>,
        spec: &ChartSpec,
        points: &[SeriesPoint],
        horizontal: bool,
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let (lo, hi) = value_range(&values);
        let n = points.len() as i32;
        let formatter = |v: &SegmentValue<i32>| category_label(&labels, v);

        let mut builder = ChartBuilder::on(root);
        builder
            .caption(spec.title, ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(if horizontal { 140 } else { 70 });

        if horizontal {
            let mut chart = builder
                .build_cartesian_2d(lo..hi, (0..n).into_segmented())
                .map_err(drawing_error)?;
            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(points.len())
                .y_label_formatter(&formatter)
                .x_desc(spec.value)
                .y_desc(spec.label)
                .draw()
                .map_err(drawing_error)?;
            chart
                .draw_series(values.iter().enumerate().map(|(i, v)| {
                    let i = i as i32;
                    Rectangle::new(
                        [(0.0, SegmentValue::Exact(i)), (*v, SegmentValue::Exact(i + 1))],
                        color(i as usize).filled(),
                    )
                }))
                .map_err(drawing_error)?;
        } else {
            let mut chart = builder
                .build_cartesian_2d((0..n).into_segmented(), lo..hi)
                .map_err(drawing_error)?;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(points.len())
                .x_label_formatter(&formatter)
                .x_desc(spec.label)
                .y_desc(spec.value)
                .draw()
                .map_err(drawing_error)?;
            chart
                .draw_series(values.iter().enumerate().map(|(i, v)| {
                    let i = i as i32;
                    let mut bar = Rectangle::new(
                        [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                        color(i as usize).filled(),
                    );
                    bar.set_margin(0, 0, 6, 6);
                    bar
                }))
                .map_err(drawing_error)?;
        }
        Ok(())
    }

    fn draw_line(
        root: &DrawingArea<BitMapBackend, Shift>,
        spec: &ChartSpec,
        points: &[SeriesPoint],
        filled: bool,
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let (lo, hi) = value_range(&values);
        let last = (points.len() as i32 - 1).max(1);
        let coords: Vec<(i32, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as i32, *v))
            .collect();
        let line_color = color(0);

        let mut chart = ChartBuilder::on(root)
            .caption(spec.title, ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0..last, lo..hi)
            .map_err(drawing_error)?;
        chart
            .configure_mesh()
            .x_labels(points.len())
            .x_label_formatter(&|i: &i32| {
                usize::try_from(*i)
                    .ok()
                    .and_then(|i| labels.get(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .x_desc(spec.label)
            .y_desc(spec.value)
            .draw()
            .map_err(drawing_error)?;

        if filled {
            chart
                .draw_series(
                    AreaSeries::new(coords.iter().copied(), 0.0, line_color.mix(0.3))
                        .border_style(line_color.stroke_width(2)),
                )
                .map_err(drawing_error)?;
        } else {
            chart
                .draw_series(LineSeries::new(
                    coords.iter().copied(),
                    line_color.stroke_width(2),
                ))
                .map_err(drawing_error)?;
        }
        chart
            .draw_series(
                coords
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 4, line_color.filled())),
            )
            .map_err(drawing_error)?;
        Ok(())
    }

    fn draw_radial(
        root: &DrawingArea<BitMapBackend, Shift>,
        spec: &ChartSpec,
        series: &ChartSeries,
    ) -> Result<(), RenderError> {
        let root = root
            .titled(spec.title, ("sans-serif", 26))
            .map_err(drawing_error)?;
        let (width, height) = root.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.38;
        let label_style = ("sans-serif", 14).into_font();

        let points = series.points();
        let sizes: Vec<f64> = points.iter().map(|p| p.value.max(0.0)).collect();
        let colors: Vec<RGBColor> = (0..points.len()).map(color).collect();
        let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();

        match series {
            ChartSeries::Nested(groups) if spec.kind == ChartKind::Sunburst => {
                let mut child_sizes = Vec::new();
                let mut child_colors = Vec::new();
                let mut child_labels = Vec::new();
                for (g, group) in groups.iter().enumerate() {
                    let base = color(g);
                    for (c, child) in group.children.iter().enumerate() {
                        child_sizes.push(child.value.max(0.0));
                        child_colors.push(if c % 2 == 0 { base } else { darken(base) });
                        child_labels.push(child.label.clone());
                    }
                }
                let mut outer = Pie::new(&center, &radius, &child_sizes, &child_colors, &child_labels);
                outer.start_angle(-90.0);
                outer.label_style(label_style.clone());
                root.draw(&outer).map_err(drawing_error)?;

                let inner_radius = radius * 0.65;
                let mut inner = Pie::new(&center, &inner_radius, &sizes, &colors, &labels);
                inner.start_angle(-90.0);
                inner.label_offset(-45.0);
                inner.label_style(label_style.color(&WHITE));
                root.draw(&inner).map_err(drawing_error)?;
            }
            _ => {
                let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
                pie.start_angle(-90.0);
                pie.label_style(label_style);
                pie.percentages(("sans-serif", 13).into_font().color(&WHITE));
                if spec.kind == ChartKind::Donut {
                    pie.donut_hole(radius * 0.45);
                }
                root.draw(&pie).map_err(drawing_error)?;
            }
        }
        Ok(())
    }
}

fn darken(color: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = color;
    RGBColor(
        (f64::from(r) * 0.75) as u8,
        (f64::from(g) * 0.75) as u8,
        (f64::from(b) * 0.75) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    #[test]
    fn value_range_includes_zero_with_headroom() {
        assert_eq!(value_range(&[10.0, 20.0]), (0.0, 22.0));
        let (lo, hi) = value_range(&[-5.0, 5.0]);
        assert_eq!((lo, hi), (-6.0, 6.0));
        assert_eq!(value_range(&[]), (0.0, 1.0));
        assert_eq!(value_range(&[0.0, 0.0]), (0.0, 1.0));
    }

    #[test]
    fn segment_labels_map_to_categories() {
        let labels = vec!["Pune".to_string(), "Delhi".to_string()];
        assert_eq!(category_label(&labels, &SegmentValue::CenterOf(1)), "Delhi");
        assert_eq!(category_label(&labels, &SegmentValue::Exact(0)), "Pune");
        assert_eq!(category_label(&labels, &SegmentValue::CenterOf(5)), "");
        assert_eq!(category_label(&labels, &SegmentValue::Last), "");
    }

    #[test]
    fn empty_or_mismatched_tables_are_rejected_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let spec = ChartSpec::new(ChartKind::Bar, "Revenue", "city", "total_revenue");

        let empty = QueryTable::new(vec!["city".into(), "total_revenue".into()], Vec::new());
        assert!(matches!(
            StaticChartRenderer::render_png(&spec, &empty, &path, (400, 300)),
            Err(RenderError::Empty("Revenue"))
        ));

        let wrong = QueryTable::new(
            vec!["cuisine_type".into()],
            vec![vec![Value::Text("Indian".into())]],
        );
        assert!(matches!(
            StaticChartRenderer::render_png(&spec, &wrong, &path, (400, 300)),
            Err(RenderError::Chart(ChartError::MissingColumn("city")))
        ));
        assert!(!path.exists());
    }
}
