use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    history::windows::{MAX_WINDOW_SPAN_DAYS, plan_windows},
    models::{
        candle_series::CandleSeries,
        date_range::{DateRange, DateWindow},
        request_params::HistoryRequest,
        resolution::Resolution,
    },
    providers::{HistoryProvider, ProviderError},
};

/// What to do when one window of a symbol's range fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFailurePolicy {
    /// Abort the symbol on the first failing window.
    #[default]
    Propagate,
    /// Log the failure, record it and continue with the next window.
    SkipWithWarning,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Fetching {symbol} for {window} failed: {source}")]
    Window {
        symbol: String,
        window: DateWindow,
        #[source]
        source: ProviderError,
    },
}

/// Successful result of fetching one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// At least one candle came back.
    Rows(CandleSeries),
    /// Every window answered but none had candles.
    Empty,
}

impl FetchOutcome {
    pub fn row_count(&self) -> usize {
        match self {
            FetchOutcome::Rows(series) => series.len(),
            FetchOutcome::Empty => 0,
        }
    }
}

/// A window dropped under [`WindowFailurePolicy::SkipWithWarning`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedWindow {
    pub window: DateWindow,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchStats {
    /// Remote calls made, including failed ones.
    pub windows_requested: usize,
    pub skipped_windows: Vec<SkippedWindow>,
}

impl FetchStats {
    /// `true` when windows were requested and every one of them was skipped.
    pub fn all_windows_failed(&self) -> bool {
        self.windows_requested > 0 && self.skipped_windows.len() == self.windows_requested
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub outcome: FetchOutcome,
    pub stats: FetchStats,
}

/// Walks a date range window by window for one symbol at a time.
#[derive(Clone)]
pub struct HistoryFetcher {
    provider: Arc<dyn HistoryProvider>,
    span_days: u32,
    policy: WindowFailurePolicy,
}

impl HistoryFetcher {
    pub fn new(provider: Arc<dyn HistoryProvider>) -> Self {
        Self {
            provider,
            span_days: MAX_WINDOW_SPAN_DAYS,
            policy: WindowFailurePolicy::default(),
        }
    }

    /// Overrides the window span; values above the API limit are clamped.
    pub fn with_span_days(mut self, span_days: u32) -> Self {
        self.span_days = span_days.min(MAX_WINDOW_SPAN_DAYS);
        self
    }

    pub fn with_policy(mut self, policy: WindowFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> WindowFailurePolicy {
        self.policy
    }

    /// Fetches every window of `range` for `symbol`.
    pub async fn fetch(
        &self,
        symbol: &str,
        range: &DateRange,
        resolution: Resolution,
    ) -> Result<FetchOutcome, FetchError> {
        Ok(self.fetch_with_stats(symbol, range, resolution).await?.outcome)
    }

    /// Like [`HistoryFetcher::fetch`], also reporting calls made and skipped windows.
    ///
    /// Windows are requested one after another in date order and their rows
    /// appended as received.
    pub async fn fetch_with_stats(
        &self,
        symbol: &str,
        range: &DateRange,
        resolution: Resolution,
    ) -> Result<FetchReport, FetchError> {
        let mut candles = Vec::new();
        let mut stats = FetchStats::default();

        for window in plan_windows(range, self.span_days) {
            let request = HistoryRequest {
                symbol: symbol.to_string(),
                resolution,
                window,
            };
            stats.windows_requested += 1;

            match self.provider.fetch_window(&request).await {
                Ok(rows) => {
                    debug!(symbol, %window, rows = rows.len(), "window fetched");
                    candles.extend(rows);
                }
                Err(source) => match self.policy {
                    WindowFailurePolicy::Propagate => {
                        return Err(FetchError::Window {
                            symbol: symbol.to_string(),
                            window,
                            source,
                        });
                    }
                    WindowFailurePolicy::SkipWithWarning => {
                        warn!(symbol, %window, error = %source, "skipping failed window");
                        stats.skipped_windows.push(SkippedWindow {
                            window,
                            reason: source.to_string(),
                        });
                    }
                },
            }
        }

        let outcome = if candles.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Rows(CandleSeries {
                symbol: symbol.to_string(),
                resolution,
                candles,
            })
        };

        Ok(FetchReport { outcome, stats })
    }
}
