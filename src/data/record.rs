//! Order Record Module
//! Raw (nullable) and cleaned (fully typed) order rows plus their enumerations.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use std::fmt;

/// Implements `as_str`, `parse` and `Display` for a unit enum with fixed labels.
macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Case-insensitive lookup by label.
            pub fn parse(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

labelled_enum!(Gender { Male => "Male", Female => "Female", Other => "Other" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Delivered,
    Cancelled,
}

labelled_enum!(OrderStatus { Delivered => "Delivered", Cancelled => "Cancelled" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderDay {
    Weekday,
    Weekend,
}

labelled_enum!(OrderDay { Weekday => "Weekday", Weekend => "Weekend" });

impl OrderDay {
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => OrderDay::Weekend,
            _ => OrderDay::Weekday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Youth,
    Adults,
}

labelled_enum!(AgeGroup { Youth => "Youth", Adults => "Adults" });

impl AgeGroup {
    /// Youth is the open interval (15, 24); both ends belong to Adults.
    pub fn from_age(age: i64) -> Self {
        if age > 15 && age < 24 {
            AgeGroup::Youth
        } else {
            AgeGroup::Adults
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryPerformance {
    Good,
    Moderate,
    Worst,
}

labelled_enum!(DeliveryPerformance { Good => "Good", Moderate => "Moderate", Worst => "Worst" });

impl DeliveryPerformance {
    pub fn from_rating(rating: i64) -> Self {
        if rating >= 4 {
            DeliveryPerformance::Good
        } else if rating >= 2 {
            DeliveryPerformance::Moderate
        } else {
            DeliveryPerformance::Worst
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeakHourIndicator {
    High,
    Low,
}

labelled_enum!(PeakHourIndicator { High => "High", Low => "Low" });

impl From<bool> for PeakHourIndicator {
    fn from(peak_hour: bool) -> Self {
        if peak_hour {
            PeakHourIndicator::High
        } else {
            PeakHourIndicator::Low
        }
    }
}

/// English weekday name, e.g. "Monday".
pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One row as read from the CSV extract. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOrder {
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub customer_age: Option<f64>,
    pub customer_gender: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub restaurant_id: Option<String>,
    pub restaurant_name: Option<String>,
    pub cuisine_type: Option<String>,
    pub order_date: Option<String>,
    pub order_time: Option<String>,
    pub delivery_time_min: Option<f64>,
    pub distance_km: Option<f64>,
    pub order_value: Option<f64>,
    pub discount_applied: Option<f64>,
    pub final_amount: Option<f64>,
    pub payment_mode: Option<String>,
    pub order_status: Option<String>,
    pub cancellation_reason: Option<String>,
    pub delivery_partner_id: Option<String>,
    pub delivery_rating: Option<f64>,
    pub restaurant_rating: Option<f64>,
    pub order_day: Option<String>,
    pub peak_hour: Option<String>,
    pub profit_margin: Option<f64>,
}

/// A cleaned, enriched order ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: Option<String>,
    pub customer_age: i64,
    pub customer_gender: Gender,
    pub city: String,
    pub area: String,
    pub restaurant_id: Option<String>,
    pub restaurant_name: Option<String>,
    pub cuisine_type: String,
    pub order_date: NaiveDate,
    pub order_time: NaiveTime,
    pub delivery_time_min: i64,
    pub distance_km: f64,
    pub order_value: f64,
    pub discount_applied: f64,
    pub final_amount: f64,
    pub payment_mode: String,
    pub order_status: OrderStatus,
    pub cancellation_reason: String,
    pub delivery_partner_id: Option<String>,
    pub delivery_rating: i64,
    pub restaurant_rating: Option<f64>,
    pub order_day: OrderDay,
    pub peak_hour: bool,
    pub profit_margin: Option<f64>,
    pub customer_age_group: AgeGroup,
    pub delivery_performance: DeliveryPerformance,
    pub profit_margin_percent: Option<f64>,
    pub peak_hour_indicator: PeakHourIndicator,
    pub order_day_name: String,
}

impl From<&OrderRecord> for RawOrder {
    fn from(record: &OrderRecord) -> Self {
        Self {
            order_id: Some(record.order_id.clone()),
            customer_id: record.customer_id.clone(),
            customer_age: Some(record.customer_age as f64),
            customer_gender: Some(record.customer_gender.to_string()),
            city: Some(record.city.clone()),
            area: Some(record.area.clone()),
            restaurant_id: record.restaurant_id.clone(),
            restaurant_name: record.restaurant_name.clone(),
            cuisine_type: Some(record.cuisine_type.clone()),
            order_date: Some(record.order_date.format("%Y-%m-%d").to_string()),
            order_time: Some(record.order_time.format("%H:%M:%S").to_string()),
            delivery_time_min: Some(record.delivery_time_min as f64),
            distance_km: Some(record.distance_km),
            order_value: Some(record.order_value),
            discount_applied: Some(record.discount_applied),
            final_amount: Some(record.final_amount),
            payment_mode: Some(record.payment_mode.clone()),
            order_status: Some(record.order_status.to_string()),
            cancellation_reason: Some(record.cancellation_reason.clone()),
            delivery_partner_id: record.delivery_partner_id.clone(),
            delivery_rating: Some(record.delivery_rating as f64),
            restaurant_rating: record.restaurant_rating,
            order_day: Some(record.order_day.to_string()),
            peak_hour: Some(record.peak_hour.to_string()),
            profit_margin: record.profit_margin,
        }
    }
}
