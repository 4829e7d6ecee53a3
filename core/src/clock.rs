//! Injected time source and UTC bucketing helpers
//!
//! Nothing in the ledger sleeps or schedules: durations, cooldowns and the
//! daily reset are evaluated by comparing a `Clock` reading against stored
//! timestamps on each call.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

/// Seconds since the Unix epoch
pub type Timestamp = u64;

/// Source of the current time, non-decreasing across calls
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `chrono::Utc`.
///
/// Readings are clamped so that a backwards step of the system clock never
/// produces a timestamp earlier than one already handed out.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock that never reads earlier than `floor`, e.g. the latest
    /// timestamp already recorded by a persisted ledger
    pub fn with_floor(floor: Timestamp) -> Self {
        Self {
            last: AtomicU64::new(floor),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = Utc::now().timestamp().max(0) as u64;
        let previous = self.last.fetch_max(wall, Ordering::SeqCst);
        previous.max(wall)
    }
}

/// Hand-driven clock for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move the clock to `timestamp`; earlier values are ignored
    pub fn set(&self, timestamp: Timestamp) {
        self.now.fetch_max(timestamp, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// UTC calendar day number of a timestamp
pub fn day_bucket(timestamp: Timestamp) -> u64 {
    timestamp / SECONDS_PER_DAY
}

/// UTC hour of day (0-23) of a timestamp
pub fn hour_of_day(timestamp: Timestamp) -> u8 {
    ((timestamp % SECONDS_PER_DAY) / SECONDS_PER_HOUR) as u8
}

/// Human-readable UTC rendering, used by hosts for display
pub fn format_timestamp(timestamp: Timestamp) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("@{}", timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-01 00:00:00 UTC
    const JAN_1_2024: Timestamp = 1_704_067_200;

    #[test]
    fn test_day_bucket_boundaries() {
        assert_eq!(day_bucket(JAN_1_2024), day_bucket(JAN_1_2024 + SECONDS_PER_DAY - 1));
        assert_eq!(day_bucket(JAN_1_2024) + 1, day_bucket(JAN_1_2024 + SECONDS_PER_DAY));
    }

    #[test]
    fn test_hour_of_day() {
        assert_eq!(hour_of_day(JAN_1_2024), 0);
        assert_eq!(hour_of_day(JAN_1_2024 + 22 * SECONDS_PER_HOUR), 22);
        assert_eq!(hour_of_day(JAN_1_2024 + 22 * SECONDS_PER_HOUR + 3599), 22);
        assert_eq!(hour_of_day(JAN_1_2024 + 23 * SECONDS_PER_HOUR), 23);
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new(1000);
        clock.advance(300);
        assert_eq!(clock.now(), 1300);

        clock.set(500);
        assert_eq!(clock.now(), 1300);

        clock.set(2000);
        assert_eq!(clock.now(), 2000);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a > JAN_1_2024);
    }

    #[test]
    fn test_system_clock_floor() {
        // Far beyond any real wall clock reading
        let floor = JAN_1_2024 * 100;
        let clock = SystemClock::with_floor(floor);
        assert_eq!(clock.now(), floor);
        assert_eq!(clock.now(), floor);

        let past_floor = SystemClock::with_floor(JAN_1_2024);
        assert!(past_floor.now() > JAN_1_2024);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(JAN_1_2024), "2024-01-01 00:00:00 UTC");
    }
}
