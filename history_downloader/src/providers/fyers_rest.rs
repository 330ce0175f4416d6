//! Fyers API v3 quote-history provider.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{FyersCredentials, FyersProvider, FyersSettings};
