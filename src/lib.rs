//! Food Insights - Online food delivery analysis dashboard
//!
//! Cleans the order extract, stores it in SQLite and presents a catalog of
//! aggregate analyses as tables and charts.

pub mod catalog;
pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod ingest;
pub mod logging;
pub mod stats;
pub mod store;
