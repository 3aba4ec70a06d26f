//! Wall-clock helpers for timeout bookkeeping.
//!
//! The wait primitives never retry, so a caller that needs to block until a
//! deadline loops and recomputes the remaining time on each pass:
//!
//! ```rust
//! use fdmux::clock;
//!
//! let deadline = clock::now_millis() + 50;
//! let timeout = clock::poll_timeout(Some(deadline), clock::now_millis());
//! assert!(timeout <= 50);
//! ```

use crate::sys::platform;

/// Remaining times below this many milliseconds are treated as expired.
pub const CLOCK_GRANULARITY_MS: i64 = 10;

/// Returns the wall clock in microseconds since the Unix epoch.
pub fn now_micros() -> i64 {
    platform::now_micros()
}

/// Returns the wall clock in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    now_micros() / 1_000
}

/// Computes the wait timeout for the next deadline.
///
/// - `None` means no deadline and yields `-1` (block forever).
/// - A deadline closer than [`CLOCK_GRANULARITY_MS`] yields `0`.
/// - Otherwise the remaining milliseconds, clamped to `i32::MAX`.
pub fn poll_timeout(next_deadline_ms: Option<i64>, now_ms: i64) -> i32 {
    let Some(deadline) = next_deadline_ms else {
        return -1;
    };

    let remaining = deadline.saturating_sub(now_ms);
    if remaining < CLOCK_GRANULARITY_MS {
        return 0;
    }

    i32::try_from(remaining).unwrap_or(i32::MAX)
}
