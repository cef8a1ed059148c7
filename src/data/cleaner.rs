//! Data Cleaner Module
//! Turns raw extract rows into validated, typed and enriched order records.
//!
//! The steps run in a fixed order because later imputations group by values
//! that earlier steps fill in:
//!
//! 1. drop rows without an order date (and rows that cannot be keyed)
//! 2. constant fills for categoricals, column medians for rating and discount
//! 3. Tukey clipping of the discount
//! 4. grouped medians for customer age and order value
//! 5. final amount recomputed from order value and discount
//! 6. cancellation reason defaults by order status
//! 7. grouped medians for delivery time, then distance
//! 8. casts, followed by the derived feature columns

use crate::data::record::{
    day_name, AgeGroup, DeliveryPerformance, Gender, OrderDay, OrderRecord, OrderStatus,
    PeakHourIndicator, RawOrder,
};
use crate::stats::{StatsCalculator, TukeyBounds};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

pub const DEFAULT_CITY: &str = "Hyderabad";
pub const DEFAULT_CUISINE: &str = "Indian";
pub const DEFAULT_PAYMENT_MODE: &str = "Card";
pub const DEFAULT_AREA: &str = "South";
pub const NO_CANCELLATION: &str = "No Cancellation";
pub const NOT_MENTIONED: &str = "Not Mentioned";

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];
const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M", "%I:%M %p"];

#[derive(Error, Debug, PartialEq)]
pub enum CleanError {
    #[error("No value available to impute {column} in group {group}")]
    EmptyGroup { column: &'static str, group: String },
    #[error("Column {column} has no values to compute a median from")]
    EmptyColumn { column: &'static str },
}

/// What to do when every row of an imputation group is missing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Use the median of the whole column.
    #[default]
    GlobalMedian,
    /// Abort cleaning with `CleanError::EmptyGroup`.
    Fail,
}

/// Summary of everything the cleaner dropped, filled or clipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub dropped_missing_date: usize,
    pub dropped_missing_id: usize,
    pub dropped_duplicate_id: usize,
    pub dropped_invalid_status: usize,
    /// Missing values filled, keyed by column.
    pub filled: BTreeMap<&'static str, usize>,
    /// Groups that had to fall back to the column median, keyed by column.
    pub group_fallbacks: BTreeMap<&'static str, usize>,
    pub clipped_discounts: usize,
    pub discount_bounds: Option<TukeyBounds>,
}

impl CleanReport {
    pub fn dropped(&self) -> usize {
        self.dropped_missing_date
            + self.dropped_missing_id
            + self.dropped_duplicate_id
            + self.dropped_invalid_status
    }

    fn count_fill(&mut self, column: &'static str) {
        *self.filled.entry(column).or_default() += 1;
    }
}

/// Cleaned records together with the report of how they were produced.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub records: Vec<OrderRecord>,
    pub report: CleanReport,
}

/// A raw row that survived the key filters.
struct Working {
    raw: RawOrder,
    date: NaiveDate,
    status: OrderStatus,
}

type NumericField = fn(&mut RawOrder) -> &mut Option<f64>;

/// Runs the cleaning and feature-engineering pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataCleaner {
    policy: FallbackPolicy,
}

impl DataCleaner {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Clean a batch of raw rows. Pure: nothing is persisted here.
    pub fn clean(&self, rows: Vec<RawOrder>) -> Result<CleanOutput, CleanError> {
        let mut report = CleanReport {
            input_rows: rows.len(),
            ..CleanReport::default()
        };

        let mut working = Self::drop_unkeyed(rows, &mut report);
        if working.is_empty() {
            tracing::warn!(input = report.input_rows, "no rows left after dropping unkeyed rows");
            return Ok(CleanOutput {
                records: Vec::new(),
                report,
            });
        }

        Self::fill_constants(&mut working, &mut report)?;
        Self::clip_discounts(&mut working, &mut report);

        self.impute_grouped(
            &mut working,
            "customer_age",
            |r| &mut r.customer_age,
            |w| group_label(&[&w.raw.customer_gender, &w.raw.area]),
            &mut report,
        )?;
        self.impute_grouped(
            &mut working,
            "order_value",
            |r| &mut r.order_value,
            |w| group_label(&[&w.raw.city, &w.raw.area, &w.raw.cuisine_type]),
            &mut report,
        )?;

        for row in &mut working {
            row.raw.final_amount = match (row.raw.order_value, row.raw.discount_applied) {
                (Some(value), Some(discount)) => Some(value - discount),
                _ => None,
            };
        }

        Self::fill_cancellation_reasons(&mut working, &mut report);

        self.impute_grouped(
            &mut working,
            "delivery_time_min",
            |r| &mut r.delivery_time_min,
            |w| number_label(w.raw.delivery_rating),
            &mut report,
        )?;
        self.impute_grouped(
            &mut working,
            "distance_km",
            |r| &mut r.distance_km,
            |w| {
                format!(
                    "{}/{}",
                    number_label(w.raw.delivery_time_min),
                    number_label(w.raw.delivery_rating)
                )
            },
            &mut report,
        )?;

        let records = working
            .into_iter()
            .map(Self::finalize)
            .collect::<Result<Vec<_>, _>>()?;
        report.output_rows = records.len();

        tracing::info!(
            input = report.input_rows,
            output = report.output_rows,
            dropped = report.dropped(),
            clipped = report.clipped_discounts,
            "cleaning finished"
        );
        for (column, count) in &report.filled {
            tracing::debug!(column, count, "filled missing values");
        }

        Ok(CleanOutput { records, report })
    }

    /// Step 1: the order date is a required key. Rows without an id or a
    /// recognised status cannot be stored either, and duplicate ids keep the
    /// first occurrence.
    fn drop_unkeyed(rows: Vec<RawOrder>, report: &mut CleanReport) -> Vec<Working> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut working = Vec::with_capacity(rows.len());

        for raw in rows {
            let Some(date) = raw.order_date.as_deref().and_then(parse_date) else {
                report.dropped_missing_date += 1;
                continue;
            };
            let Some(order_id) = raw.order_id.clone() else {
                report.dropped_missing_id += 1;
                continue;
            };
            let Some(status) = raw.order_status.as_deref().and_then(OrderStatus::parse) else {
                report.dropped_invalid_status += 1;
                continue;
            };
            if !seen.insert(order_id) {
                report.dropped_duplicate_id += 1;
                continue;
            }
            working.push(Working { raw, date, status });
        }

        if report.dropped() > 0 {
            tracing::info!(
                missing_date = report.dropped_missing_date,
                missing_id = report.dropped_missing_id,
                invalid_status = report.dropped_invalid_status,
                duplicate_id = report.dropped_duplicate_id,
                "dropped rows"
            );
        }
        working
    }

    /// Step 2: medians are taken before any value is filled or clipped.
    fn fill_constants(rows: &mut [Working], report: &mut CleanReport) -> Result<(), CleanError> {
        let rating_median = column_median(rows, |r| r.delivery_rating)
            .ok_or(CleanError::EmptyColumn { column: "delivery_rating" })?;
        let discount_median = column_median(rows, |r| r.discount_applied)
            .ok_or(CleanError::EmptyColumn { column: "discount_applied" })?;

        for row in rows.iter_mut() {
            let raw = &mut row.raw;
            fill_text(&mut raw.city, DEFAULT_CITY, "city", report);
            fill_text(&mut raw.cuisine_type, DEFAULT_CUISINE, "cuisine_type", report);
            fill_text(&mut raw.payment_mode, DEFAULT_PAYMENT_MODE, "payment_mode", report);
            fill_text(&mut raw.customer_gender, Gender::Other.as_str(), "customer_gender", report);
            fill_text(&mut raw.peak_hour, "false", "peak_hour", report);
            fill_text(&mut raw.order_time, "00:00:00", "order_time", report);
            fill_text(&mut raw.area, DEFAULT_AREA, "area", report);

            // Unrecognised values join `Other` before the (gender, area) age groups form.
            let gender = raw
                .customer_gender
                .as_deref()
                .and_then(Gender::parse)
                .unwrap_or(Gender::Other);
            raw.customer_gender = Some(gender.to_string());

            if raw.delivery_rating.is_none() {
                raw.delivery_rating = Some(rating_median);
                report.count_fill("delivery_rating");
            }
            if raw.discount_applied.is_none() {
                raw.discount_applied = Some(discount_median);
                report.count_fill("discount_applied");
            }
        }
        Ok(())
    }

    /// Step 3: bounds come from the filled, not yet clipped, column.
    ///
    /// Clipping moves the quartiles, so on a short or tightly packed column a
    /// second pass over the output can clip again.
    fn clip_discounts(rows: &mut [Working], report: &mut CleanReport) {
        let discounts: Vec<f64> = rows.iter().filter_map(|w| w.raw.discount_applied).collect();
        let Some(bounds) = StatsCalculator::tukey_bounds(&discounts) else {
            return;
        };

        for row in rows.iter_mut() {
            if let Some(discount) = row.raw.discount_applied.as_mut() {
                if !bounds.contains(*discount) {
                    *discount = bounds.clip(*discount);
                    report.clipped_discounts += 1;
                }
            }
        }

        tracing::debug!(
            lower = bounds.lower,
            upper = bounds.upper,
            clipped = report.clipped_discounts,
            "clipped discount outliers"
        );
        report.discount_bounds = Some(bounds);
    }

    /// Step 6.
    fn fill_cancellation_reasons(rows: &mut [Working], report: &mut CleanReport) {
        for row in rows.iter_mut() {
            if row.raw.cancellation_reason.is_some() {
                continue;
            }
            let reason = match row.status {
                OrderStatus::Delivered => NO_CANCELLATION,
                OrderStatus::Cancelled => NOT_MENTIONED,
            };
            row.raw.cancellation_reason = Some(reason.to_string());
            report.count_fill("cancellation_reason");
        }
    }

    /// Fill a numeric column with the median of rows sharing the same group key.
    fn impute_grouped<K>(
        &self,
        rows: &mut [Working],
        column: &'static str,
        field: NumericField,
        key: K,
        report: &mut CleanReport,
    ) -> Result<(), CleanError>
    where
        K: Fn(&Working) -> String,
    {
        let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
        let mut everything: Vec<f64> = Vec::new();
        for row in rows.iter_mut() {
            let group = groups.entry(key(&*row)).or_default();
            if let Some(value) = *field(&mut row.raw) {
                group.push(value);
                everything.push(value);
            }
        }

        let medians: HashMap<String, Option<f64>> = groups
            .into_iter()
            .map(|(group, values)| {
                let median = StatsCalculator::median(&values);
                (group, median)
            })
            .collect();
        let global = StatsCalculator::median(&everything);

        for row in rows.iter_mut() {
            if field(&mut row.raw).is_some() {
                continue;
            }
            let group = key(&*row);
            let value = match medians.get(&group).copied().flatten() {
                Some(median) => median,
                None => {
                    if self.policy == FallbackPolicy::Fail {
                        return Err(CleanError::EmptyGroup { column, group });
                    }
                    let median = global.ok_or(CleanError::EmptyColumn { column })?;
                    tracing::warn!(column, %group, median, "group has no values, using column median");
                    *report.group_fallbacks.entry(column).or_default() += 1;
                    median
                }
            };
            *field(&mut row.raw) = Some(value);
            report.count_fill(column);
        }
        Ok(())
    }

    /// Steps 8-13: casts and derived columns.
    fn finalize(row: Working) -> Result<OrderRecord, CleanError> {
        let Working { raw, date, status } = row;

        let customer_age = required(raw.customer_age, "customer_age")?.trunc() as i64;
        let delivery_time_min =
            required(raw.delivery_time_min, "delivery_time_min")?.trunc() as i64;
        let delivery_rating = required(raw.delivery_rating, "delivery_rating")?.trunc() as i64;
        let order_value = required(raw.order_value, "order_value")?;
        let discount_applied = required(raw.discount_applied, "discount_applied")?;
        let peak_hour = raw.peak_hour.as_deref().is_some_and(parse_flag);
        let order_time = raw
            .order_time
            .as_deref()
            .and_then(parse_time)
            .unwrap_or(NaiveTime::MIN);
        let order_day = raw
            .order_day
            .as_deref()
            .and_then(OrderDay::parse)
            .unwrap_or_else(|| OrderDay::from_date(date));
        let customer_gender = raw
            .customer_gender
            .as_deref()
            .and_then(Gender::parse)
            .unwrap_or(Gender::Other);

        Ok(OrderRecord {
            order_id: raw.order_id.unwrap_or_default(),
            customer_id: raw.customer_id,
            customer_age,
            customer_gender,
            city: raw.city.unwrap_or_else(|| DEFAULT_CITY.to_string()),
            area: raw.area.unwrap_or_else(|| DEFAULT_AREA.to_string()),
            restaurant_id: raw.restaurant_id,
            restaurant_name: raw.restaurant_name,
            cuisine_type: raw.cuisine_type.unwrap_or_else(|| DEFAULT_CUISINE.to_string()),
            order_date: date,
            order_time,
            delivery_time_min,
            distance_km: required(raw.distance_km, "distance_km")?,
            order_value,
            discount_applied,
            final_amount: order_value - discount_applied,
            payment_mode: raw
                .payment_mode
                .unwrap_or_else(|| DEFAULT_PAYMENT_MODE.to_string()),
            order_status: status,
            cancellation_reason: raw.cancellation_reason.unwrap_or_default(),
            delivery_partner_id: raw.delivery_partner_id,
            delivery_rating,
            restaurant_rating: raw.restaurant_rating,
            order_day,
            peak_hour,
            profit_margin: raw.profit_margin,
            customer_age_group: AgeGroup::from_age(customer_age),
            delivery_performance: DeliveryPerformance::from_rating(delivery_rating),
            profit_margin_percent: raw.profit_margin.map(|m| m * 100.0),
            peak_hour_indicator: PeakHourIndicator::from(peak_hour),
            order_day_name: day_name(date).to_string(),
        })
    }
}

fn required(value: Option<f64>, column: &'static str) -> Result<f64, CleanError> {
    value.ok_or(CleanError::EmptyColumn { column })
}

fn fill_text(
    value: &mut Option<String>,
    default: &str,
    column: &'static str,
    report: &mut CleanReport,
) {
    if value.is_none() {
        *value = Some(default.to_string());
        report.count_fill(column);
    }
}

fn column_median(rows: &[Working], get: impl Fn(&RawOrder) -> Option<f64>) -> Option<f64> {
    let values: Vec<f64> = rows.iter().filter_map(|w| get(&w.raw)).collect();
    StatsCalculator::median(&values)
}

fn group_label(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .map(|p| p.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("/")
}

// Display of f64 round-trips, so equal labels mean equal values.
fn number_label(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parse a date in one of the accepted layouts; a time part is ignored.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.time())
        })
}

pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "yes" | "y" | "1" | "1.0"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raw(order_id: &str) -> RawOrder {
        RawOrder {
            order_id: Some(order_id.to_string()),
            customer_id: Some(format!("CUST-{order_id}")),
            customer_age: Some(30.0),
            customer_gender: Some("Male".into()),
            city: Some("Chennai".into()),
            area: Some("North".into()),
            restaurant_id: Some("R1".into()),
            restaurant_name: Some("Restaurant_1".into()),
            cuisine_type: Some("Chinese".into()),
            order_date: Some("2024-03-18".into()),
            order_time: Some("19:30".into()),
            delivery_time_min: Some(35.0),
            distance_km: Some(4.2),
            order_value: Some(400.0),
            discount_applied: Some(40.0),
            final_amount: Some(360.0),
            payment_mode: Some("UPI".into()),
            order_status: Some("Delivered".into()),
            cancellation_reason: None,
            delivery_partner_id: Some("DP1".into()),
            delivery_rating: Some(4.0),
            restaurant_rating: Some(4.1),
            order_day: Some("Weekday".into()),
            peak_hour: Some("True".into()),
            profit_margin: Some(0.2),
        }
    }

    fn clean(rows: Vec<RawOrder>) -> CleanOutput {
        DataCleaner::default().clean(rows).unwrap()
    }

    fn find<'a>(records: &'a [OrderRecord], id: &str) -> &'a OrderRecord {
        records.iter().find(|r| r.order_id == id).unwrap()
    }

    #[test]
    fn rows_without_order_date_are_dropped() {
        let mut missing = raw("2");
        missing.order_date = None;
        let mut garbage = raw("3");
        garbage.order_date = Some("not a date".into());

        let out = clean(vec![raw("1"), missing, garbage]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.report.dropped_missing_date, 2);
        assert_eq!(out.report.output_rows, 1);
    }

    #[test]
    fn unkeyed_and_duplicate_rows_are_dropped() {
        let mut no_id = raw("x");
        no_id.order_id = None;
        let mut pending = raw("4");
        pending.order_status = Some("Pending".into());
        let mut duplicate = raw("1");
        duplicate.order_value = Some(999.0);

        let out = clean(vec![raw("1"), no_id, pending, duplicate]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].order_value, 400.0);
        assert_eq!(out.report.dropped_missing_id, 1);
        assert_eq!(out.report.dropped_invalid_status, 1);
        assert_eq!(out.report.dropped_duplicate_id, 1);
    }

    #[test]
    fn categorical_defaults_are_applied() {
        let mut row = raw("1");
        row.city = None;
        row.cuisine_type = None;
        row.payment_mode = None;
        row.customer_gender = None;
        row.peak_hour = None;
        row.order_time = None;
        row.area = None;

        let out = clean(vec![row]);
        let record = &out.records[0];
        assert_eq!(record.city, "Hyderabad");
        assert_eq!(record.cuisine_type, "Indian");
        assert_eq!(record.payment_mode, "Card");
        assert_eq!(record.customer_gender, Gender::Other);
        assert!(!record.peak_hour);
        assert_eq!(record.peak_hour_indicator, PeakHourIndicator::Low);
        assert_eq!(record.order_time, NaiveTime::MIN);
        assert_eq!(record.area, "South");
        assert_eq!(out.report.filled.get("city"), Some(&1));
    }

    #[test]
    fn rating_and_discount_use_column_medians() {
        let mut a = raw("1");
        a.delivery_rating = Some(2.0);
        a.discount_applied = Some(10.0);
        let mut b = raw("2");
        b.delivery_rating = Some(4.0);
        b.discount_applied = Some(30.0);
        let mut c = raw("3");
        c.delivery_rating = None;
        c.discount_applied = None;

        let out = clean(vec![a, b, c]);
        let filled = find(&out.records, "3");
        assert_eq!(filled.delivery_rating, 3);
        assert_eq!(filled.discount_applied, 20.0);
        assert_eq!(filled.delivery_performance, DeliveryPerformance::Moderate);
    }

    #[test]
    fn outlier_discount_is_clipped_and_final_amount_follows() {
        let discounts = [100.0, 200.0, 300.0, 400.0, 10_000.0];
        let rows: Vec<RawOrder> = discounts
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let mut row = raw(&i.to_string());
                row.discount_applied = Some(*d);
                row.order_value = Some(20_000.0);
                row.final_amount = Some(-1.0);
                row
            })
            .collect();

        let out = clean(rows);
        let bounds = out.report.discount_bounds.unwrap();
        assert_eq!(bounds.upper, 700.0);
        assert_eq!(out.report.clipped_discounts, 1);

        let outlier = find(&out.records, "4");
        assert_eq!(outlier.discount_applied, 700.0);
        assert_eq!(outlier.final_amount, 20_000.0 - 700.0);
        for record in &out.records {
            assert!(bounds.contains(record.discount_applied));
            assert_eq!(record.final_amount, record.order_value - record.discount_applied);
        }
    }

    #[test]
    fn customer_age_uses_gender_and_area_group() {
        let mut known = raw("1");
        known.customer_gender = Some("Female".into());
        known.area = Some("South".into());
        known.customer_age = Some(30.0);
        let mut first = raw("2");
        first.customer_gender = Some("Female".into());
        first.area = Some("South".into());
        first.customer_age = None;
        let mut second = raw("3");
        second.customer_gender = Some("Female".into());
        second.area = Some("South".into());
        second.customer_age = None;
        let mut other_group = raw("4");
        other_group.customer_age = Some(60.0);

        let out = clean(vec![known, first, second, other_group]);
        assert_eq!(find(&out.records, "2").customer_age, 30);
        assert_eq!(find(&out.records, "3").customer_age, 30);
        assert_eq!(out.report.filled.get("customer_age"), Some(&2));
    }

    #[test]
    fn unrecognised_gender_shares_the_other_age_group() {
        let mut other = raw("1");
        other.customer_gender = Some("Other".into());
        other.customer_age = Some(60.0);
        let mut unrecognised = raw("2");
        unrecognised.customer_gender = Some("Prefer not to say".into());
        unrecognised.customer_age = Some(20.0);
        let mut missing = raw("3");
        missing.customer_gender = Some("other".into());
        missing.customer_age = None;
        let mut male = raw("4");
        male.customer_age = Some(90.0);

        let out = clean(vec![other, unrecognised, missing, male]);
        assert_eq!(find(&out.records, "2").customer_gender, Gender::Other);
        assert_eq!(find(&out.records, "3").customer_age, 40);
        assert_eq!(out.report.group_fallbacks.get("customer_age"), None);
    }

    #[test]
    fn order_value_uses_city_area_cuisine_group() {
        let mut a = raw("1");
        a.order_value = Some(100.0);
        let mut b = raw("2");
        b.order_value = Some(300.0);
        let mut c = raw("3");
        c.order_value = None;
        let mut elsewhere = raw("4");
        elsewhere.city = Some("Delhi".into());
        elsewhere.order_value = Some(5_000.0);

        let out = clean(vec![a, b, c, elsewhere]);
        let filled = find(&out.records, "3");
        assert_eq!(filled.order_value, 200.0);
        assert_eq!(filled.final_amount, 200.0 - filled.discount_applied);
    }

    #[test]
    fn empty_group_falls_back_to_global_median() {
        let mut a = raw("1");
        a.customer_gender = Some("Male".into());
        a.customer_age = Some(20.0);
        let mut b = raw("2");
        b.customer_gender = Some("Male".into());
        b.customer_age = Some(40.0);
        let mut lonely = raw("3");
        lonely.customer_gender = Some("Female".into());
        lonely.customer_age = None;

        let out = clean(vec![a, b, lonely]);
        assert_eq!(find(&out.records, "3").customer_age, 30);
        assert_eq!(out.report.group_fallbacks.get("customer_age"), Some(&1));
    }

    #[test]
    fn empty_group_fails_under_strict_policy() {
        let a = raw("1");
        let mut lonely = raw("2");
        lonely.customer_gender = Some("Female".into());
        lonely.customer_age = None;

        let err = DataCleaner::new(FallbackPolicy::Fail)
            .clean(vec![a, lonely])
            .unwrap_err();
        assert_eq!(
            err,
            CleanError::EmptyGroup {
                column: "customer_age",
                group: "Female/North".into()
            }
        );
    }

    #[test]
    fn cancellation_reason_defaults_follow_status() {
        let delivered = raw("1");
        let mut cancelled = raw("2");
        cancelled.order_status = Some("Cancelled".into());
        let mut explained = raw("3");
        explained.order_status = Some("Cancelled".into());
        explained.cancellation_reason = Some("Late Delivery".into());

        let out = clean(vec![delivered, cancelled, explained]);
        assert_eq!(find(&out.records, "1").cancellation_reason, NO_CANCELLATION);
        assert_eq!(find(&out.records, "2").cancellation_reason, NOT_MENTIONED);
        assert_eq!(find(&out.records, "3").cancellation_reason, "Late Delivery");
        assert!(out
            .records
            .iter()
            .filter(|r| r.order_status == OrderStatus::Delivered)
            .all(|r| r.cancellation_reason != NOT_MENTIONED));
    }

    #[test]
    fn distance_imputation_sees_imputed_delivery_time() {
        let mut a = raw("1");
        a.delivery_rating = Some(5.0);
        a.delivery_time_min = Some(20.0);
        a.distance_km = Some(2.0);
        let mut b = raw("2");
        b.delivery_rating = Some(5.0);
        b.delivery_time_min = None;
        b.distance_km = None;
        let mut c = raw("3");
        c.delivery_rating = Some(3.0);
        c.delivery_time_min = Some(20.0);
        c.distance_km = Some(9.0);

        let out = clean(vec![a, b, c]);
        let filled = find(&out.records, "2");
        // delivery time comes from the rating-5 group, distance from (20, 5)
        assert_eq!(filled.delivery_time_min, 20);
        assert_eq!(filled.distance_km, 2.0);
    }

    #[test]
    fn casts_truncate_and_derive_features() {
        let mut row = raw("1");
        row.customer_age = Some(23.9);
        row.delivery_rating = Some(1.7);
        row.delivery_time_min = Some(44.6);
        row.order_day = None;
        row.order_date = Some("2024-03-16".into());
        row.profit_margin = Some(0.25);

        let out = clean(vec![row]);
        let record = &out.records[0];
        assert_eq!(record.customer_age, 23);
        assert_eq!(record.customer_age_group, AgeGroup::Youth);
        assert_eq!(record.delivery_rating, 1);
        assert_eq!(record.delivery_performance, DeliveryPerformance::Worst);
        assert_eq!(record.delivery_time_min, 44);
        assert_eq!(record.order_day, OrderDay::Weekend);
        assert_eq!(record.order_day_name, "Saturday");
        assert_eq!(record.profit_margin_percent, Some(25.0));
        assert!(record.peak_hour);
        assert_eq!(record.peak_hour_indicator, PeakHourIndicator::High);
        assert_eq!(record.order_time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    }

    #[test]
    fn age_boundaries_map_to_expected_groups() {
        let rows = [(1, 20.0), (2, 24.0), (3, 15.0)]
            .iter()
            .map(|(id, age)| {
                let mut row = raw(&id.to_string());
                row.customer_age = Some(*age);
                row
            })
            .collect();
        let out = clean(rows);
        assert_eq!(find(&out.records, "1").customer_age_group, AgeGroup::Youth);
        assert_eq!(find(&out.records, "2").customer_age_group, AgeGroup::Adults);
        assert_eq!(find(&out.records, "3").customer_age_group, AgeGroup::Adults);
    }

    #[test]
    fn second_pass_is_a_no_op_when_bounds_hold() {
        let mut rows = Vec::new();
        for i in 0..12 {
            let mut row = raw(&i.to_string());
            row.discount_applied = Some(if i == 11 { 5_000.0 } else { 10.0 * i as f64 });
            row.customer_age = if i % 3 == 0 { None } else { Some(18.0 + i as f64) };
            row.delivery_rating = if i % 4 == 0 { None } else { Some((i % 5) as f64) };
            row.distance_km = if i % 5 == 0 { None } else { Some(1.5 * i as f64) };
            row.cancellation_reason = None;
            rows.push(row);
        }

        let first = clean(rows);
        let again: Vec<RawOrder> = first.records.iter().map(RawOrder::from).collect();
        let second = clean(again);

        assert_eq!(first.records, second.records);
        assert_eq!(second.report.clipped_discounts, 0);
        assert!(second.report.filled.is_empty());
    }

    #[test]
    fn short_column_can_clip_again_on_second_pass() {
        let rows = [0.0, 10.0, 10.0, 10.0]
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let mut row = raw(&i.to_string());
                row.discount_applied = Some(*d);
                row
            })
            .collect();

        let first = clean(rows);
        assert_eq!(first.report.clipped_discounts, 1);
        assert_eq!(find(&first.records, "0").discount_applied, 3.75);

        let again: Vec<RawOrder> = first.records.iter().map(RawOrder::from).collect();
        let second = clean(again);
        assert_eq!(second.report.clipped_discounts, 1);
        assert_eq!(find(&second.records, "0").discount_applied, 6.09375);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let out = clean(Vec::new());
        assert!(out.records.is_empty());
        assert_eq!(out.report.input_rows, 0);
    }

    #[test]
    fn date_and_time_parsing() {
        assert_eq!(parse_date("2022-07-15"), NaiveDate::from_ymd_opt(2022, 7, 15));
        assert_eq!(parse_date("07/15/2022"), NaiveDate::from_ymd_opt(2022, 7, 15));
        assert_eq!(parse_date("2022-07-15 10:20:00"), NaiveDate::from_ymd_opt(2022, 7, 15));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_time("0:00"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_time("21:05:09"), NaiveTime::from_hms_opt(21, 5, 9));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("False"));
    }

    proptest! {
        #[test]
        fn derived_columns_match_base_columns(age in 0.0f64..90.0, rating in 0.0f64..5.0) {
            let mut row = raw("1");
            row.customer_age = Some(age);
            row.delivery_rating = Some(rating);

            let out = clean(vec![row]);
            let record = &out.records[0];
            let youth = record.customer_age > 15 && record.customer_age < 24;
            prop_assert_eq!(record.customer_age_group == AgeGroup::Youth, youth);
            let expected = if record.delivery_rating >= 4 {
                DeliveryPerformance::Good
            } else if record.delivery_rating >= 2 {
                DeliveryPerformance::Moderate
            } else {
                DeliveryPerformance::Worst
            };
            prop_assert_eq!(record.delivery_performance, expected);
        }
    }
}
