use serde::{Deserialize, Serialize};

use crate::models::{date_range::DateWindow, resolution::Resolution};

/// Parameters for one history request: a single symbol over a single window.
///
/// Providers receive exactly one of these per remote call. Splitting a longer
/// range into windows is the job of [`crate::history::HistoryFetcher`], not
/// the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Exchange-qualified symbol, e.g. `NSE:SBIN-EQ`.
    pub symbol: String,

    /// Candle interval.
    pub resolution: Resolution,

    /// Inclusive date window. Providers must not be asked for more than the
    /// upstream span limit.
    pub window: DateWindow,
}
