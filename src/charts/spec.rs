//! Chart Definitions
//! Static description of how a query result is plotted, and the series
//! extracted from a result table for that description.

use crate::store::QueryTable;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ChartError {
    #[error("Column '{0}' not found in query result")]
    MissingColumn(&'static str),
    #[error("Sunburst chart needs a parent column")]
    MissingParent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// One bar per row.
    Bar,
    /// Bars laid out along the y axis; `label` is the category.
    HorizontalBar,
    /// Bars with values summed per label.
    Histogram,
    Line,
    /// Line filled down to zero.
    Area,
    Pie,
    Donut,
    /// Two rings: `parent` inside, `label` outside.
    Sunburst,
}

impl ChartKind {
    pub fn is_radial(&self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Donut | ChartKind::Sunburst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: &'static str,
    /// Category column.
    pub label: &'static str,
    /// Numeric column.
    pub value: &'static str,
    /// Outer grouping column for sunburst charts.
    pub parent: Option<&'static str>,
    /// Only the first rows of the result are plotted.
    pub limit: Option<usize>,
}

impl ChartSpec {
    pub const fn new(
        kind: ChartKind,
        title: &'static str,
        label: &'static str,
        value: &'static str,
    ) -> Self {
        Self {
            kind,
            title,
            label,
            value,
            parent: None,
            limit: None,
        }
    }

    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub const fn with_parent(mut self, parent: &'static str) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Columns the result table must provide.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![self.label, self.value];
        columns.extend(self.parent);
        columns
    }
}

/// One labelled value of a flat series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// A parent slice with its children, for sunburst charts.
#[derive(Debug, Clone, PartialEq)]
pub struct RingGroup {
    pub label: String,
    pub total: f64,
    pub children: Vec<SeriesPoint>,
}

/// Plot-ready data for one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSeries {
    Flat(Vec<SeriesPoint>),
    Nested(Vec<RingGroup>),
}

impl ChartSeries {
    /// Extract the series a spec describes. Rows with a missing value are
    /// skipped; histogram and radial kinds sum values sharing a label, in
    /// first-seen order.
    pub fn from_table(table: &QueryTable, spec: &ChartSpec) -> Result<Self, ChartError> {
        let label_idx = table
            .column_index(spec.label)
            .ok_or(ChartError::MissingColumn(spec.label))?;
        let value_idx = table
            .column_index(spec.value)
            .ok_or(ChartError::MissingColumn(spec.value))?;
        let row_count = spec.limit.map_or(table.len(), |l| l.min(table.len()));

        if spec.kind == ChartKind::Sunburst {
            let parent = spec.parent.ok_or(ChartError::MissingParent)?;
            let parent_idx = table
                .column_index(parent)
                .ok_or(ChartError::MissingColumn(parent))?;

            let mut groups: Vec<RingGroup> = Vec::new();
            for row in 0..row_count {
                let Some(value) = table.number(row, value_idx) else {
                    continue;
                };
                let parent_label = table.text(row, parent_idx);
                let pos = match groups.iter().position(|g| g.label == parent_label) {
                    Some(pos) => pos,
                    None => {
                        groups.push(RingGroup {
                            label: parent_label,
                            total: 0.0,
                            children: Vec::new(),
                        });
                        groups.len() - 1
                    }
                };
                let group = &mut groups[pos];
                group.total += value;
                add_or_sum(&mut group.children, table.text(row, label_idx), value);
            }
            return Ok(ChartSeries::Nested(groups));
        }

        let sum_duplicates = matches!(spec.kind, ChartKind::Histogram) || spec.kind.is_radial();
        let mut points: Vec<SeriesPoint> = Vec::new();
        for row in 0..row_count {
            let Some(value) = table.number(row, value_idx) else {
                continue;
            };
            let label = table.text(row, label_idx);
            if sum_duplicates {
                add_or_sum(&mut points, label, value);
            } else {
                points.push(SeriesPoint { label, value });
            }
        }
        Ok(ChartSeries::Flat(points))
    }

    /// Flat view: nested series collapse to their parent totals.
    pub fn points(&self) -> Vec<SeriesPoint> {
        match self {
            ChartSeries::Flat(points) => points.clone(),
            ChartSeries::Nested(groups) => groups
                .iter()
                .map(|g| SeriesPoint {
                    label: g.label.clone(),
                    value: g.total,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartSeries::Flat(points) => points.is_empty(),
            ChartSeries::Nested(groups) => groups.is_empty(),
        }
    }
}

fn add_or_sum(points: &mut Vec<SeriesPoint>, label: String, value: f64) {
    match points.iter_mut().find(|p| p.label == label) {
        Some(point) => point.value += value,
        None => points.push(SeriesPoint { label, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    fn table() -> QueryTable {
        QueryTable::new(
            vec!["City".into(), "Cuisine_Type".into(), "Total_Revenue".into()],
            vec![
                vec![Value::Text("Pune".into()), Value::Text("Indian".into()), Value::Real(300.0)],
                vec![Value::Text("Delhi".into()), Value::Text("Indian".into()), Value::Real(200.0)],
                vec![Value::Text("Pune".into()), Value::Text("Chinese".into()), Value::Integer(100)],
                vec![Value::Text("Delhi".into()), Value::Text("Italian".into()), Value::Null],
            ],
        )
    }

    #[test]
    fn bar_keeps_rows_in_order() {
        let spec = ChartSpec::new(ChartKind::Bar, "t", "City", "Total_Revenue");
        let series = ChartSeries::from_table(&table(), &spec).unwrap();
        let labels: Vec<String> = series.points().into_iter().map(|p| p.label).collect();
        assert_eq!(labels, vec!["Pune", "Delhi", "Pune"]);
    }

    #[test]
    fn histogram_and_pie_sum_per_label() {
        for kind in [ChartKind::Histogram, ChartKind::Pie] {
            let spec = ChartSpec::new(kind, "t", "city", "total_revenue");
            let points = ChartSeries::from_table(&table(), &spec).unwrap().points();
            assert_eq!(
                points,
                vec![
                    SeriesPoint { label: "Pune".into(), value: 400.0 },
                    SeriesPoint { label: "Delhi".into(), value: 200.0 },
                ]
            );
        }
    }

    #[test]
    fn limit_applies_before_aggregation() {
        let spec = ChartSpec::new(ChartKind::Histogram, "t", "Cuisine_Type", "Total_Revenue")
            .with_limit(2);
        let points = ChartSeries::from_table(&table(), &spec).unwrap().points();
        assert_eq!(points, vec![SeriesPoint { label: "Indian".into(), value: 500.0 }]);
    }

    #[test]
    fn sunburst_nests_children_under_parents() {
        let spec = ChartSpec::new(ChartKind::Sunburst, "t", "Cuisine_Type", "Total_Revenue")
            .with_parent("City");
        let ChartSeries::Nested(groups) = ChartSeries::from_table(&table(), &spec).unwrap() else {
            panic!("expected nested series");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Pune");
        assert_eq!(groups[0].total, 400.0);
        assert_eq!(groups[0].children.len(), 2);
        assert_eq!(groups[1].children, vec![SeriesPoint { label: "Indian".into(), value: 200.0 }]);
    }

    #[test]
    fn missing_columns_are_reported() {
        let spec = ChartSpec::new(ChartKind::Bar, "t", "Restaurant_Name", "Total_Revenue");
        assert_eq!(
            ChartSeries::from_table(&table(), &spec),
            Err(ChartError::MissingColumn("Restaurant_Name"))
        );
        let spec = ChartSpec::new(ChartKind::Sunburst, "t", "City", "Total_Revenue");
        assert_eq!(ChartSeries::from_table(&table(), &spec), Err(ChartError::MissingParent));
    }
}
