//! Injectable time source. Every component that reads "now" does so through
//! a [`Clock`] so the scenarios of spec.md §8 are deterministic (spec.md §9
//! "Time sources must be injectable"). Grounded on the teacher's
//! process-relative monotonic clock in `scrapers/binance_book_ticker.rs`
//! (`mono_now_ns`), generalized here to wall-clock time since the engine's
//! indicators are keyed on `DateTime<Utc>`, not monotonic nanoseconds.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests: holds a fixed instant that callers can
/// advance explicitly.
#[derive(Debug, Clone)]
pub struct FixedClock(parking_lot::Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(parking_lot::Mutex::new(start))
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut guard = self.0.lock();
        *guard += duration;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.lock() = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}
