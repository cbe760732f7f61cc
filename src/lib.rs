//! meterstat - Turn irregular energy and carbon meter readings into chart-ready series
//!
//! This library provides functionality to:
//! - Build the complete time grid for a daily, monthly, yearly or custom timeframe
//! - Sum meter readings into grid buckets using one timezone policy
//! - Produce cumulative actual and baseline series with the excess over baseline
//! - Detect peak-usage windows and split usage into active and inactive hours
//! - Render reports as tables or JSON
//!
//! # Examples
//!
//! ```no_run
//! use meterstat::{
//!     aggregation::{Aggregator, EngineOptions},
//!     data_loader::{JsonFileSource, RecordSource},
//!     timezone::TimezoneConfig,
//!     types::{Metric, TimeframeSpec},
//! };
//!
//! #[tokio::main]
//! async fn main() -> meterstat::Result<()> {
//!     let tz = TimezoneConfig::from_cli(Some("Asia/Kolkata"), false)?;
//!     let batch = JsonFileSource::new("readings.json", Metric::Power, tz).load().await?;
//!
//!     let aggregator = Aggregator::new(EngineOptions::new(tz));
//!     let request = batch.report_request(TimeframeSpec::monthly(2024, 3), Some(420.0));
//!     let report = aggregator.build_report(&batch.records, &request)?;
//!
//!     println!("saved {:.2} kWh", report.totals.total_saved);
//!     Ok(())
//! }
//! ```

pub mod active_hours;
pub mod aggregation;
pub mod baseline;
pub mod bucketizer;
pub mod cli;
pub mod data_loader;
pub mod gradient;
pub mod grid;
pub mod output;
pub mod peaks;
pub mod series;

// Re-export core modules so existing `meterstat::types` etc. paths keep working
pub use meterstat_core::{aggregation_types, error, numeric, sources, timezone, types};

// Re-export commonly used types
pub use error::{MeterstatError, Result};
pub use types::{
    ActiveInactiveTotals, BucketRow, GridKey, Metric, PeakWindow, RawRecord, SeriesRow,
    TimeframeSpec,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
