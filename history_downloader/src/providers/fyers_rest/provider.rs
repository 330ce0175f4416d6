use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use tracing::debug;

use crate::{
    models::{candle::Candle, request_params::HistoryRequest},
    providers::{
        HistoryProvider, ProviderError, ProviderInitError,
        fyers_rest::{params::construct_params, response::FyersHistoryResponse},
    },
};

pub const DEFAULT_BASE_URL: &str = "https://api-t1.fyers.in";
pub const HISTORY_PATH: &str = "/data/history";
pub const DEFAULT_REQUESTS_PER_SECOND: NonZeroU32 = nonzero!(10u32);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const CLIENT_ID_VAR: &str = "FYERS_CLIENT_ID";
pub const ACCESS_TOKEN_VAR: &str = "FYERS_ACCESS_TOKEN";

/// App client id and session access token.
pub struct FyersCredentials {
    client_id: SecretString,
    access_token: SecretString,
}

impl FyersCredentials {
    pub fn new(client_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        let client_id: String = client_id.into();
        let access_token: String = access_token.into();
        Self {
            client_id: SecretString::new(client_id.into_boxed_str()),
            access_token: SecretString::new(access_token.into_boxed_str()),
        }
    }

    /// Reads credentials from `FYERS_CLIENT_ID` and `FYERS_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self, ProviderInitError> {
        Ok(Self {
            client_id: SecretString::new(get_env_var(CLIENT_ID_VAR)?.into()),
            access_token: SecretString::new(get_env_var(ACCESS_TOKEN_VAR)?.into()),
        })
    }

    /// Value of the `Authorization` header: `client_id:access_token`.
    fn authorization(&self) -> SecretString {
        SecretString::new(
            format!(
                "{}:{}",
                self.client_id.expose_secret(),
                self.access_token.expose_secret()
            )
            .into(),
        )
    }
}

/// Connection settings for [`FyersProvider`].
#[derive(Debug, Clone)]
pub struct FyersSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub requests_per_second: NonZeroU32,
}

impl Default for FyersSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
        }
    }
}

pub struct FyersProvider {
    client: Client,
    history_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl FyersProvider {
    /// Creates a provider with explicit credentials.
    pub fn new(
        credentials: &FyersCredentials,
        settings: &FyersSettings,
    ) -> Result<Self, ProviderInitError> {
        if settings.timeout.is_zero() {
            return Err(ProviderInitError::InvalidSetting(
                "timeout must be greater than zero".to_string(),
            ));
        }

        let mut auth =
            header::HeaderValue::from_str(credentials.authorization().expose_secret())?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            history_url: format!("{}{}", settings.base_url.trim_end_matches('/'), HISTORY_PATH),
            limiter: RateLimiter::direct(Quota::per_second(settings.requests_per_second)),
        })
    }

    /// Creates a provider with credentials read from the environment.
    ///
    /// Fails before any network call if either variable is missing.
    pub fn from_env(settings: &FyersSettings) -> Result<Self, ProviderInitError> {
        Self::new(&FyersCredentials::from_env()?, settings)
    }
}

#[async_trait]
impl HistoryProvider for FyersProvider {
    async fn fetch_window(&self, request: &HistoryRequest) -> Result<Vec<Candle>, ProviderError> {
        self.limiter.until_ready().await;

        let query = construct_params(request);
        debug!(symbol = %request.symbol, window = %request.window, "requesting history window");

        let response = self.client.get(&self.history_url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            // Error bodies are usually the same JSON envelope; prefer its message.
            let message = serde_json::from_str::<FyersHistoryResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.message.map(|m| (parsed.code, m)));
            return Err(match message {
                Some((code, message)) => ProviderError::Api { code, message },
                None => ProviderError::Api {
                    code: Some(i64::from(status.as_u16())),
                    message: body,
                },
            });
        }

        let body = response.text().await?;
        let parsed: FyersHistoryResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Decode(format!("invalid history response: {e}")))?;
        parsed.into_candles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_joins_client_id_and_token() {
        let creds = FyersCredentials::new("APP-100", "tok");
        assert_eq!(creds.authorization().expose_secret(), "APP-100:tok");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let creds = FyersCredentials::new("APP-100", "tok");
        let settings = FyersSettings {
            timeout: Duration::ZERO,
            ..FyersSettings::default()
        };
        assert!(matches!(
            FyersProvider::new(&creds, &settings),
            Err(ProviderInitError::InvalidSetting(_))
        ));
    }

    #[test]
    fn credentials_with_newlines_are_rejected() {
        let creds = FyersCredentials::new("APP-100", "tok\nen");
        assert!(matches!(
            FyersProvider::new(&creds, &FyersSettings::default()),
            Err(ProviderInitError::InvalidCredentials(_))
        ));
    }
}
