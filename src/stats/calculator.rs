//! Statistics Calculator Module
//! Medians, NumPy-compatible percentiles, Tukey fences and column summaries.

use statrs::statistics::Statistics;

/// Multiplier applied to the interquartile range for outlier fences.
pub const TUKEY_FACTOR: f64 = 1.5;

/// Lower and upper clipping bounds derived from the interquartile range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TukeyBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl TukeyBounds {
    /// Clamp a value into the fences.
    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Descriptive summary of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for ColumnSummary {
    fn default() -> Self {
        Self {
            column: String::new(),
            count: 0,
            mean: f64::NAN,
            std_dev: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Handles statistical calculations over plain value slices.
pub struct StatsCalculator;

impl StatsCalculator {
    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Median of the non-NaN values, `None` when there are none.
    pub fn median(values: &[f64]) -> Option<f64> {
        let sorted = Self::sorted(values);
        let n = sorted.len();
        if n == 0 {
            return None;
        }

        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        Some(median)
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Compute Q1/Q3 and the 1.5·IQR fences, `None` for an empty column.
    pub fn tukey_bounds(values: &[f64]) -> Option<TukeyBounds> {
        let sorted = Self::sorted(values);
        if sorted.is_empty() {
            return None;
        }

        let q1 = Self::percentile(&sorted, 25.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;

        Some(TukeyBounds {
            q1,
            q3,
            lower: q1 - TUKEY_FACTOR * iqr,
            upper: q3 + TUKEY_FACTOR * iqr,
        })
    }

    /// Count, mean, sample standard deviation and range of a column.
    pub fn summarize(column: &str, values: &[f64]) -> ColumnSummary {
        let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if clean.is_empty() {
            return ColumnSummary {
                column: column.to_string(),
                ..ColumnSummary::default()
            };
        }

        let std_dev = if clean.len() > 1 {
            Statistics::std_dev(clean.iter())
        } else {
            0.0
        };

        ColumnSummary {
            column: column.to_string(),
            count: clean.len(),
            mean: Statistics::mean(clean.iter()),
            std_dev,
            min: Statistics::min(clean.iter()),
            max: Statistics::max(clean.iter()),
        }
    }
}
