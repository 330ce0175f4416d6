//! Splitting a date range into API-sized windows and walking them per symbol.

pub mod fetcher;
pub mod windows;

pub use fetcher::{
    FetchError, FetchOutcome, FetchReport, FetchStats, HistoryFetcher, SkippedWindow,
    WindowFailurePolicy,
};
pub use windows::{MAX_WINDOW_SPAN_DAYS, plan_windows};
