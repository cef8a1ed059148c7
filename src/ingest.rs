//! Idempotent first-load: fill the store from the CSV extract once.
//!
//! The guard is a row count, so two processes starting against an empty
//! store at the same moment could both append. One writer is assumed.

use crate::data::{CleanReport, DataCleaner, DataLoader};
use crate::store::OrderStore;
use anyhow::{Context, Result};
use std::path::Path;

/// What `ensure_loaded` did.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// The store was empty and has been filled.
    Inserted { rows: usize, report: CleanReport },
    /// The store already held data; nothing was read.
    AlreadyPresent { rows: u64 },
}

impl IngestOutcome {
    pub fn rows(&self) -> u64 {
        match self {
            IngestOutcome::Inserted { rows, .. } => *rows as u64,
            IngestOutcome::AlreadyPresent { rows } => *rows,
        }
    }
}

/// Load, clean and append the extract when the store is empty.
pub fn ensure_loaded(
    store: &mut OrderStore,
    csv_path: &Path,
    cleaner: DataCleaner,
    mut progress: impl FnMut(&str),
) -> Result<IngestOutcome> {
    let existing = store.count().context("Failed to count stored orders")?;
    if existing > 0 {
        tracing::info!(rows = existing, "orders already present, skipping ingest");
        return Ok(IngestOutcome::AlreadyPresent { rows: existing });
    }

    progress("Reading CSV file...");
    let mut loader = DataLoader::new();
    loader
        .load_csv(csv_path)
        .with_context(|| format!("Failed to load {}", csv_path.display()))?;

    progress(&format!("Cleaning {} rows...", loader.get_row_count()));
    let raw = loader.orders().context("Failed to read order columns")?;
    let output = cleaner.clean(raw).context("Failed to clean orders")?;

    progress(&format!("Inserting {} rows...", output.records.len()));
    let rows = store
        .append(&output.records)
        .context("Failed to insert orders")?;

    Ok(IngestOutcome::Inserted {
        rows,
        report: output.report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
Order_Id,Customer_Age,Customer_Gender,City,Area,Cuisine_Type,Order_Date,Order_Value,Discount_Applied,Order_Status,Delivery_Rating,Delivery_Time_Min,Distance_km
O1,22,Male,Pune,East,Italian,2023-02-01,300,30,Delivered,5,30,3
O2,,Male,Pune,East,Italian,2023-02-02,500,,Cancelled,4,40,6
O3,40,Female,Delhi,West,Indian,,250,20,Delivered,3,50,9
";

    #[test]
    fn inserts_once_then_skips() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file.flush().unwrap();

        let mut store = OrderStore::open_in_memory().unwrap();
        let mut messages = Vec::new();
        let first = ensure_loaded(&mut store, file.path(), DataCleaner::default(), |m| {
            messages.push(m.to_string())
        })
        .unwrap();

        match &first {
            IngestOutcome::Inserted { rows, report } => {
                assert_eq!(*rows, 2);
                assert_eq!(report.dropped_missing_date, 1);
            }
            other => panic!("expected insert, got {other:?}"),
        }
        assert_eq!(messages.len(), 3);
        assert_eq!(store.count().unwrap(), 2);

        let second =
            ensure_loaded(&mut store, file.path(), DataCleaner::default(), |_| {}).unwrap();
        assert!(matches!(second, IngestOutcome::AlreadyPresent { rows: 2 }));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn missing_csv_is_an_error_and_store_stays_empty() {
        let mut store = OrderStore::open_in_memory().unwrap();
        let result = ensure_loaded(
            &mut store,
            Path::new("/no/such/orders.csv"),
            DataCleaner::default(),
            |_| {},
        );
        assert!(result.is_err());
        assert_eq!(store.count().unwrap(), 0);
    }
}
