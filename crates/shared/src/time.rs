//! Clock abstraction and day arithmetic.

use chrono::{DateTime, Duration, Utc};
use std::fmt::Debug;
use std::sync::Mutex;

/// Source of the current time.
///
/// Everything that compares against "now" (rule evaluators, dedup windows,
/// the expiry sweep) receives a clock instead of calling `Utc::now()` directly.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used by tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }

    /// Move the clock forward (or backward, for a negative duration).
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whole days contained in a duration: elapsed hours divided by 24,
/// truncated toward zero.
pub fn whole_days(duration: Duration) -> i64 {
    duration.num_hours() / 24
}

/// Whole days from `earlier` to `later`. Negative when `later` is before `earlier`.
pub fn days_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    whole_days(later - earlier)
}

/// Fractional days from `earlier` to `later`.
pub fn fractional_days_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 86_400_000.0
}
