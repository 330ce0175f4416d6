use chrono::{TimeZone, Utc};
use serde::Deserialize;

use crate::models::candle::Candle;
use crate::providers::ProviderError;

/// Body of `GET /data/history`.
///
/// `s` is `"ok"`, `"no_data"` or `"error"`. Each candle row is
/// `[epoch_seconds, open, high, low, close, volume]`.
#[derive(Deserialize, Debug)]
pub struct FyersHistoryResponse {
    pub s: String,
    #[serde(default)]
    pub candles: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl FyersHistoryResponse {
    /// Converts the body into candles, keeping row order.
    ///
    /// A missing or empty `candles` field on a non-error status is an empty
    /// window, not a failure.
    pub fn into_candles(self) -> Result<Vec<Candle>, ProviderError> {
        match self.s.as_str() {
            "ok" | "no_data" => self
                .candles
                .unwrap_or_default()
                .iter()
                .map(|row| candle_from_row(row))
                .collect(),
            _ => Err(ProviderError::Api {
                code: self.code,
                message: self
                    .message
                    .unwrap_or_else(|| format!("history request returned status {:?}", self.s)),
            }),
        }
    }
}

fn candle_from_row(row: &[f64]) -> Result<Candle, ProviderError> {
    let [epoch, open, high, low, close, volume] = row else {
        return Err(ProviderError::Decode(format!(
            "expected 6 fields per candle, got {}",
            row.len()
        )));
    };
    if !epoch.is_finite() || epoch.fract() != 0.0 {
        return Err(ProviderError::Decode(format!("invalid epoch: {epoch}")));
    }
    let timestamp = Utc
        .timestamp_opt(*epoch as i64, 0)
        .single()
        .ok_or_else(|| ProviderError::Decode(format!("epoch out of range: {epoch}")))?;

    Ok(Candle {
        timestamp,
        open: *open,
        high: *high,
        low: *low,
        close: *close,
        volume: *volume,
    })
}
