//! Chunked quote-history downloader for NSE cash-equity symbols.
//!
//! The catalog side lives in `symbol_catalog`; this crate walks a date range
//! window by window against the history API and packages the rows as CSV.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod history;
pub mod io;
pub mod models;
pub mod providers;
pub mod session;
