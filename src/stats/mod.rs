//! Stats module - medians, quartiles and column summaries

mod calculator;

pub use calculator::{ColumnSummary, StatsCalculator, TukeyBounds, TUKEY_FACTOR};
