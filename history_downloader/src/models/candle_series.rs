//! The per-symbol history table.

use crate::models::{candle::Candle, resolution::Resolution};

/// Every candle fetched for one symbol across the requested range.
///
/// Candles are kept in the order the windows were requested and, within a
/// window, the order the provider returned them. Nothing re-sorts them.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    /// Exchange-qualified symbol (e.g. "NSE:SBIN-EQ"), written as the first CSV column.
    pub symbol: String,
    /// Interval of each candle.
    pub resolution: Resolution,
    /// The rows.
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}
