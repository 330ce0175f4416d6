//! Provider abstraction for quote-history sources.
//!
//! This module defines the [`HistoryProvider`] trait, the single seam between
//! the window-walking fetcher and a concrete broker API. A provider answers
//! one [`HistoryRequest`] (one symbol, one date window) with the candles the
//! upstream returned, in the order it returned them.
//!
//! The trait is async and object safe, so callers can hold an
//! `Arc<dyn HistoryProvider>` and swap in a stub for tests.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use history_downloader::models::{candle::Candle, request_params::HistoryRequest};
//! use history_downloader::providers::{HistoryProvider, ProviderError};
//!
//! struct EmptyProvider;
//!
//! #[async_trait]
//! impl HistoryProvider for EmptyProvider {
//!     async fn fetch_window(
//!         &self,
//!         _request: &HistoryRequest,
//!     ) -> Result<Vec<Candle>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod fyers_rest;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use thiserror::Error;

use crate::models::{candle::Candle, request_params::HistoryRequest};

/// Trait for fetching one window of candle history from a data provider.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetches candles for one symbol over one date window.
    ///
    /// # Returns
    ///
    /// * `Ok(vec![])` - The upstream answered but had no candles for the window.
    /// * `Ok(candles)` - Candles in the order the upstream sent them.
    /// * `Err(ProviderError)` - Transport failure, API error, or an undecodable row.
    async fn fetch_window(&self, request: &HistoryRequest) -> Result<Vec<Candle>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Error)]
pub enum ProviderInitError {
    /// Missing credential environment variable.
    #[error("Missing credentials: {0}")]
    MissingEnvVar(#[from] MissingEnvVarError),

    /// Failed to init the reqwest client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// Credentials contain characters that cannot go into an HTTP header.
    #[error("Invalid credential format: {0}")]
    InvalidCredentials(#[from] reqwest::header::InvalidHeaderValue),

    /// A provider setting is out of range.
    #[error("Invalid provider setting: {0}")]
    InvalidSetting(String),
}

/// Errors that can occur within a `HistoryProvider` implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider's API returned an error (e.g., expired token, unknown symbol).
    #[error("API error{}: {message}", code_suffix(.code))]
    Api { code: Option<i64>, message: String },

    /// The response parsed but a candle row could not be decoded.
    #[error("Malformed candle data: {0}")]
    Decode(String),
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(" {c}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{date_range::DateWindow, resolution::Resolution};

    struct FixedProvider;
    struct FailingProvider;

    #[async_trait]
    impl HistoryProvider for FixedProvider {
        async fn fetch_window(
            &self,
            _request: &HistoryRequest,
        ) -> Result<Vec<Candle>, ProviderError> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl HistoryProvider for FailingProvider {
        async fn fetch_window(
            &self,
            _request: &HistoryRequest,
        ) -> Result<Vec<Candle>, ProviderError> {
            Err(ProviderError::Api {
                code: Some(-16),
                message: "token expired".into(),
            })
        }
    }

    fn get_provider(name: &str) -> Arc<dyn HistoryProvider> {
        if name == "fixed" {
            Arc::new(FixedProvider)
        } else {
            Arc::new(FailingProvider)
        }
    }

    fn request() -> HistoryRequest {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        HistoryRequest {
            symbol: "NSE:SBIN-EQ".to_string(),
            resolution: Resolution::Day,
            window: DateWindow { start: day, end: day },
        }
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let result = get_provider("fixed").fetch_window(&request()).await;
        assert!(result.unwrap().is_empty());

        let err = get_provider("failing")
            .fetch_window(&request())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API error -16: token expired");
    }
}
