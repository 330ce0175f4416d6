//! Canonical in-memory representation of one OHLCV candle.
//!
//! This is the output shape of every [`HistoryProvider`](crate::providers::HistoryProvider),
//! independent of how the upstream API encodes rows.

use chrono::{DateTime, Utc};

/// A single OHLCV observation for one trading interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    /// Start of the interval (UTC).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the interval.
    pub high: f64,

    /// Lowest price during the interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Traded volume.
    pub volume: f64,
}
