//! Core types, traits, and utilities for meterstat
//!
//! This crate provides the foundational types, error handling, the
//! timezone / hour-of-day policy and the data-source precedence list used
//! by the aggregation engine in the `meterstat` crate.

pub mod aggregation_types;
pub mod error;
pub mod numeric;
pub mod sources;
pub mod timezone;
pub mod types;

// Re-export commonly used types
pub use error::{MeterstatError, Result};
pub use sources::{DataSource, Precedence, Sourced};
pub use types::{
    ActiveInactiveTotals, BucketRow, GridKey, Metric, PeakWindow, RawRecord, SeriesRow,
    TimeframeSpec,
};
