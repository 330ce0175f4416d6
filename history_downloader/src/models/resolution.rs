use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minute intervals accepted by the history endpoint.
pub const MINUTE_RESOLUTIONS: [u16; 13] = [1, 2, 3, 5, 10, 15, 20, 30, 45, 60, 120, 180, 240];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Unsupported minute resolution: {0}")]
    UnsupportedMinutes(u16),

    #[error("Invalid resolution: {0}")]
    InvalidInput(String),
}

/// Candle interval requested from the history API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Resolution {
    #[default]
    Day,
    Week,
    Month,
    Minutes(u16),
}

impl Resolution {
    pub fn minutes(amount: u16) -> Result<Self, ResolutionError> {
        if MINUTE_RESOLUTIONS.contains(&amount) {
            Ok(Self::Minutes(amount))
        } else {
            Err(ResolutionError::UnsupportedMinutes(amount))
        }
    }

    /// Value of the `resolution` query parameter.
    pub fn as_api_value(&self) -> String {
        match self {
            Resolution::Day => "D".to_string(),
            Resolution::Week => "W".to_string(),
            Resolution::Month => "M".to_string(),
            Resolution::Minutes(amount) => amount.to_string(),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_api_value())
    }
}

impl FromStr for Resolution {
    type Err = ResolutionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "d" | "1d" | "day" | "daily" => Ok(Resolution::Day),
            "w" | "1w" | "week" | "weekly" => Ok(Resolution::Week),
            "m" | "mo" | "1mo" | "month" | "monthly" => Ok(Resolution::Month),
            other => {
                let digits = other
                    .strip_suffix("min")
                    .or_else(|| other.strip_suffix('m'))
                    .unwrap_or(other);
                let amount = digits
                    .parse::<u16>()
                    .map_err(|_| ResolutionError::InvalidInput(value.to_string()))?;
                Resolution::minutes(amount)
            }
        }
    }
}

impl TryFrom<String> for Resolution {
    type Error = ResolutionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.as_api_value()
    }
}
