//! Order Store
//! SQLite persistence for cleaned orders and read-only aggregation queries.

use crate::data::OrderRecord;
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::path::Path;

use super::{QueryTable, StoreError};

pub const TABLE_NAME: &str = "food_order_details";

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS food_order_details (
        order_id TEXT PRIMARY KEY NOT NULL,
        customer_id TEXT,
        customer_age INTEGER,
        customer_gender TEXT CHECK (customer_gender IN ('Male', 'Female', 'Other')),
        city TEXT,
        area TEXT,
        restaurant_id TEXT,
        restaurant_name TEXT,
        cuisine_type TEXT,
        order_date TEXT NOT NULL,
        order_time TEXT NOT NULL,
        delivery_time_min INTEGER,
        distance_km REAL,
        order_value REAL NOT NULL,
        discount_applied REAL DEFAULT 0,
        final_amount REAL NOT NULL,
        payment_mode TEXT,
        order_status TEXT NOT NULL CHECK (order_status IN ('Delivered', 'Cancelled')),
        cancellation_reason TEXT,
        delivery_partner_id TEXT,
        delivery_rating INTEGER,
        restaurant_rating REAL,
        order_day TEXT CHECK (order_day IN ('Weekday', 'Weekend')),
        peak_hour INTEGER,
        profit_margin REAL,
        customer_age_group TEXT CHECK (customer_age_group IN ('Youth', 'Adults')),
        delivery_performance TEXT CHECK (delivery_performance IN ('Good', 'Moderate', 'Worst')),
        profit_margin_percent REAL,
        peak_hour_indicator TEXT CHECK (peak_hour_indicator IN ('High', 'Low')),
        order_day_name TEXT
    )";

const INSERT_SQL: &str = "
    INSERT INTO food_order_details (
        order_id, customer_id, customer_age, customer_gender, city, area,
        restaurant_id, restaurant_name, cuisine_type, order_date, order_time,
        delivery_time_min, distance_km, order_value, discount_applied, final_amount,
        payment_mode, order_status, cancellation_reason, delivery_partner_id,
        delivery_rating, restaurant_rating, order_day, peak_hour, profit_margin,
        customer_age_group, delivery_performance, profit_margin_percent,
        peak_hour_indicator, order_day_name
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
        ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30
    )";

/// Decimal columns are stored with two fractional digits.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Relational store holding the single wide order table.
pub struct OrderStore {
    conn: Connection,
}

impl OrderStore {
    /// Open (or create) the database file and make sure the table exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened order store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(CREATE_TABLE_SQL, [])?;
        Ok(())
    }

    /// Number of stored orders.
    pub fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {TABLE_NAME}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// Append records in a single transaction; either all rows land or none.
    pub fn append(&mut self, records: &[OrderRecord]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            for r in records {
                // final_amount is derived from the stored components, not rounded on its own.
                let order_value = round2(r.order_value);
                let discount_applied = round2(r.discount_applied);
                stmt.execute(params![
                    r.order_id,
                    r.customer_id,
                    r.customer_age,
                    r.customer_gender.as_str(),
                    r.city,
                    r.area,
                    r.restaurant_id,
                    r.restaurant_name,
                    r.cuisine_type,
                    r.order_date.format("%Y-%m-%d").to_string(),
                    r.order_time.format("%H:%M:%S").to_string(),
                    r.delivery_time_min,
                    round2(r.distance_km),
                    order_value,
                    discount_applied,
                    order_value - discount_applied,
                    r.payment_mode,
                    r.order_status.as_str(),
                    r.cancellation_reason,
                    r.delivery_partner_id,
                    r.delivery_rating,
                    r.restaurant_rating.map(round2),
                    r.order_day.as_str(),
                    r.peak_hour,
                    r.profit_margin.map(round2),
                    r.customer_age_group.as_str(),
                    r.delivery_performance.as_str(),
                    r.profit_margin_percent.map(round2),
                    r.peak_hour_indicator.as_str(),
                    r.order_day_name,
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(rows = records.len(), table = TABLE_NAME, "appended orders");
        Ok(records.len())
    }

    /// Run a read-only query and collect every row.
    pub fn query(&self, sql: &str) -> Result<QueryTable, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        if !stmt.readonly() {
            return Err(StoreError::NotReadOnly);
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rows = rows.len(), columns = width, "query finished");
        Ok(QueryTable::new(columns, rows))
    }
}
