//! Error types for meterstat
//!
//! This module defines the error types used throughout the meterstat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use meterstat_core::error::{MeterstatError, Result};
//!
//! fn load_readings() -> Result<String> {
//!     // io::Error converts into MeterstatError through `?`
//!     let body = std::fs::read_to_string("readings.json")?;
//!     Ok(body)
//! }
//! # let _ = load_readings();
//! ```

use thiserror::Error;

/// Main error type for meterstat operations
///
/// Malformed individual readings are never reported through this type; they
/// are counted and skipped. Only failures that invalidate a whole invocation
/// surface here.
#[derive(Error, Debug)]
pub enum MeterstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested timeframe cannot produce a grid
    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Input document has an unexpected shape
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A command-line value is out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in meterstat
///
/// # Example
///
/// ```
/// use meterstat_core::Result;
///
/// fn total_kwh() -> Result<f64> {
///     Ok(42.0)
/// }
/// ```
pub type Result<T> = std::result::Result<T, MeterstatError>;
