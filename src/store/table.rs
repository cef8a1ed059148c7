//! Query Result Table
//! Column names plus loosely typed cells as returned by SQLite.

use polars::prelude::*;
use rusqlite::types::Value;
use std::fs::File;
use std::path::Path;

use super::StoreError;

/// Result set of one read query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Display text of a cell; missing cells render empty.
    pub fn text(&self, row: usize, column: usize) -> String {
        self.value(row, column).map(format_value).unwrap_or_default()
    }

    pub fn number(&self, row: usize, column: usize) -> Option<f64> {
        self.value(row, column).and_then(value_as_f64)
    }

    /// All numeric cells of a column, `None` when the column does not exist.
    pub fn numbers(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(
            (0..self.len())
                .filter_map(|row| self.number(row, idx))
                .collect(),
        )
    }

    fn is_numeric_column(&self, column: usize) -> bool {
        self.rows.iter().all(|row| {
            matches!(
                row.get(column),
                None | Some(Value::Null) | Some(Value::Integer(_)) | Some(Value::Real(_))
            )
        })
    }

    /// Convert into a Polars DataFrame; numeric columns become Float64.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                if self.is_numeric_column(idx) {
                    let values: Vec<Option<f64>> =
                        (0..self.len()).map(|row| self.number(row, idx)).collect();
                    Column::new(name.as_str().into(), values)
                } else {
                    let values: Vec<Option<String>> = (0..self.len())
                        .map(|row| match self.value(row, idx) {
                            None | Some(Value::Null) => None,
                            Some(v) => Some(format_value(v)),
                        })
                        .collect();
                    Column::new(name.as_str().into(), values)
                }
            })
            .collect();

        DataFrame::new(columns)
    }

    /// Write the table to a CSV file.
    pub fn export_csv(&self, path: &Path) -> Result<(), StoreError> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        tracing::info!(path = %path.display(), rows = self.len(), "exported table");
        Ok(())
    }
}

pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(f) => Some(*f),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{:.0}", f)
            } else {
                format!("{:.2}", f)
            }
        }
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryTable {
        QueryTable::new(
            vec!["City".into(), "Total_Revenue".into()],
            vec![
                vec![Value::Text("Pune".into()), Value::Real(1250.456)],
                vec![Value::Text("Delhi".into()), Value::Integer(900)],
                vec![Value::Null, Value::Null],
            ],
        )
    }

    #[test]
    fn lookups_and_formatting() {
        let table = sample();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_index("total_revenue"), Some(1));
        assert_eq!(table.text(0, 1), "1250.46");
        assert_eq!(table.text(1, 1), "900");
        assert_eq!(table.text(2, 0), "");
        assert_eq!(table.numbers("TOTAL_REVENUE"), Some(vec![1250.456, 900.0]));
        assert_eq!(table.numbers("missing"), None);
    }

    #[test]
    fn dataframe_conversion_types_columns() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.column("Total_Revenue").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("City").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revenue.csv");
        sample().export_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("City,Total_Revenue"));
        assert!(lines.next().unwrap().starts_with("Pune,1250.456"));
        assert_eq!(written.lines().count(), 4);
    }
}
