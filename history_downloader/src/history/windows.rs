use chrono::Days;

use crate::models::date_range::{DateRange, DateWindow};

/// Largest `end - start` distance, in days, the history API accepts per call.
pub const MAX_WINDOW_SPAN_DAYS: u32 = 100;

/// Splits `range` into contiguous, non-overlapping windows.
///
/// Each window ends `span_days` after it starts (clamped to the range end) and
/// the next one starts the following day, so a window covers at most
/// `span_days + 1` calendar days. A same-day range yields exactly one window.
pub fn plan_windows(range: &DateRange, span_days: u32) -> Vec<DateWindow> {
    let mut windows = Vec::new();
    let mut window_start = range.start();

    loop {
        let window_end = window_start
            .checked_add_days(Days::new(u64::from(span_days)))
            .map_or(range.end(), |candidate| candidate.min(range.end()));

        windows.push(DateWindow {
            start: window_start,
            end: window_end,
        });

        if window_end >= range.end() {
            break;
        }
        match window_end.succ_opt() {
            Some(next) => window_start = next,
            None => break,
        }
    }

    windows
}
