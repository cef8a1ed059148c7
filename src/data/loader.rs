//! CSV Data Loader Module
//! Reads the order extract with Polars and extracts nullable order rows.

use crate::data::record::RawOrder;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV file not found: {0}")]
    NotFound(PathBuf),
    #[error("Required column missing: {0}")]
    MissingColumn(&'static str),
    #[error("No data loaded")]
    NoData,
}

/// Column names of the extract, matched case-insensitively against the header.
pub const ORDER_COLUMNS: [&str; 25] = [
    "Order_Id",
    "Customer_ID",
    "Customer_Age",
    "Customer_Gender",
    "City",
    "Area",
    "Restaurant_ID",
    "Restaurant_Name",
    "Cuisine_Type",
    "Order_Date",
    "Order_Time",
    "Delivery_Time_Min",
    "Distance_km",
    "Order_Value",
    "Discount_Applied",
    "Final_Amount",
    "Payment_Mode",
    "Order_Status",
    "Cancellation_Reason",
    "Delivery_Partner_ID",
    "Delivery_Rating",
    "Restaurant_Rating",
    "Order_Day",
    "Peak_Hour",
    "Profit_Margin",
];

/// Handles CSV file loading with Polars for high performance.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Load a CSV file using Polars.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        if !file_path.exists() {
            return Err(LoaderError::NotFound(file_path.to_path_buf()));
        }

        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        tracing::info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded csv"
        );

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Extract order rows from the loaded DataFrame.
    pub fn orders(&self) -> Result<Vec<RawOrder>, LoaderError> {
        let df = self.df.as_ref().ok_or(LoaderError::NoData)?;
        Self::orders_from_frame(df)
    }

    /// Convert a DataFrame into nullable order rows. Absent optional columns
    /// read as all-missing; the order id column must exist.
    pub fn orders_from_frame(df: &DataFrame) -> Result<Vec<RawOrder>, LoaderError> {
        let header = ColumnIndex::new(df);
        if header.resolve("Order_Id").is_none() {
            return Err(LoaderError::MissingColumn("Order_Id"));
        }
        for name in ORDER_COLUMNS {
            if header.resolve(name).is_none() {
                tracing::warn!(column = name, "column missing from extract, treating as empty");
            }
        }

        let text = |name: &str| header.text(df, name);
        let number = |name: &str| header.number(df, name);

        let mut order_id = text("Order_Id")?.into_iter();
        let mut customer_id = text("Customer_ID")?.into_iter();
        let mut customer_age = number("Customer_Age")?.into_iter();
        let mut customer_gender = text("Customer_Gender")?.into_iter();
        let mut city = text("City")?.into_iter();
        let mut area = text("Area")?.into_iter();
        let mut restaurant_id = text("Restaurant_ID")?.into_iter();
        let mut restaurant_name = text("Restaurant_Name")?.into_iter();
        let mut cuisine_type = text("Cuisine_Type")?.into_iter();
        let mut order_date = text("Order_Date")?.into_iter();
        let mut order_time = text("Order_Time")?.into_iter();
        let mut delivery_time_min = number("Delivery_Time_Min")?.into_iter();
        let mut distance_km = number("Distance_km")?.into_iter();
        let mut order_value = number("Order_Value")?.into_iter();
        let mut discount_applied = number("Discount_Applied")?.into_iter();
        let mut final_amount = number("Final_Amount")?.into_iter();
        let mut payment_mode = text("Payment_Mode")?.into_iter();
        let mut order_status = text("Order_Status")?.into_iter();
        let mut cancellation_reason = text("Cancellation_Reason")?.into_iter();
        let mut delivery_partner_id = text("Delivery_Partner_ID")?.into_iter();
        let mut delivery_rating = number("Delivery_Rating")?.into_iter();
        let mut restaurant_rating = number("Restaurant_Rating")?.into_iter();
        let mut order_day = text("Order_Day")?.into_iter();
        let mut peak_hour = text("Peak_Hour")?.into_iter();
        let mut profit_margin = number("Profit_Margin")?.into_iter();

        let rows = (0..df.height())
            .map(|_| RawOrder {
                order_id: order_id.next().flatten(),
                customer_id: customer_id.next().flatten(),
                customer_age: customer_age.next().flatten(),
                customer_gender: customer_gender.next().flatten(),
                city: city.next().flatten(),
                area: area.next().flatten(),
                restaurant_id: restaurant_id.next().flatten(),
                restaurant_name: restaurant_name.next().flatten(),
                cuisine_type: cuisine_type.next().flatten(),
                order_date: order_date.next().flatten(),
                order_time: order_time.next().flatten(),
                delivery_time_min: delivery_time_min.next().flatten(),
                distance_km: distance_km.next().flatten(),
                order_value: order_value.next().flatten(),
                discount_applied: discount_applied.next().flatten(),
                final_amount: final_amount.next().flatten(),
                payment_mode: payment_mode.next().flatten(),
                order_status: order_status.next().flatten(),
                cancellation_reason: cancellation_reason.next().flatten(),
                delivery_partner_id: delivery_partner_id.next().flatten(),
                delivery_rating: delivery_rating.next().flatten(),
                restaurant_rating: restaurant_rating.next().flatten(),
                order_day: order_day.next().flatten(),
                peak_hour: peak_hour.next().flatten(),
                profit_margin: profit_margin.next().flatten(),
            })
            .collect();

        Ok(rows)
    }
}

/// Case-insensitive lookup from expected column names to the header's names.
struct ColumnIndex {
    names: HashMap<String, String>,
    height: usize,
}

impl ColumnIndex {
    fn new(df: &DataFrame) -> Self {
        let names = df
            .get_column_names()
            .iter()
            .map(|s| (s.to_lowercase(), s.to_string()))
            .collect();
        Self {
            names,
            height: df.height(),
        }
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        self.names.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// Trimmed strings; blanks become missing.
    fn text(&self, df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
        let Some(actual) = self.resolve(name) else {
            return Ok(vec![None; self.height]);
        };
        let column = df.column(actual)?.cast(&DataType::String)?;
        let values = column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| {
                v.map(str::trim)
                    .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"))
                    .map(str::to_string)
            })
            .collect();
        Ok(values)
    }

    /// Float values; unparseable cells and NaN become missing.
    fn number(&self, df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoaderError> {
        let Some(actual) = self.resolve(name) else {
            return Ok(vec![None; self.height]);
        };
        let column = df.column(actual)?.cast(&DataType::Float64)?;
        let values = column
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Ok(values)
    }
}
