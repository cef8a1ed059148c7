//! Store module - SQLite persistence and query results

mod database;
mod table;

pub use database::{OrderStore, TABLE_NAME};
pub use table::{format_value, value_as_f64, QueryTable};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Only read-only queries are allowed")]
    NotReadOnly,
}
