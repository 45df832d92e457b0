//! Export Zaif account history to CSV.
//!
//! [`history::HistoryFetcher`] pages through a private history endpoint,
//! retrying transient failures and suppressing records repeated across
//! overlapping pages. [`export::Exporter`] runs it for each export kind and
//! [`export::CsvSink`] writes the resulting rows.

pub mod api;
pub mod config;
pub mod export;
pub mod history;
pub mod models;

pub use api::{ApiError, HistorySource, MarketCatalog};
pub use config::{ConfigError, ExportConfig};
pub use export::{CsvSink, ExportKind, Exporter, SinkError};
pub use history::{FetchError, HistoryFetcher, RetryPolicy};
