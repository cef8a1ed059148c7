//! Data module - CSV loading, order records and cleaning

mod cleaner;
mod loader;
mod record;

pub use cleaner::{
    parse_date, parse_flag, parse_time, CleanError, CleanOutput, CleanReport, DataCleaner,
    FallbackPolicy, NOT_MENTIONED, NO_CANCELLATION,
};
pub use loader::{DataLoader, LoaderError, ORDER_COLUMNS};
pub use record::{
    day_name, AgeGroup, DeliveryPerformance, Gender, OrderDay, OrderRecord, OrderStatus,
    PeakHourIndicator, RawOrder,
};
