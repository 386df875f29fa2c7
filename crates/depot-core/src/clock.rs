//! Write-time clocks.
//!
//! Stores ask a [`Clock`] for the current time and combine it with the latest
//! timestamp of the key via [`next_timestamp`], so a key's timestamps never go
//! backwards even if the wall clock does.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::Timestamp;

/// Source of write timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Timestamp;
}

/// Wall clock in Unix milliseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(saturating_millis)
            .unwrap_or(0);
        Timestamp::from_millis(millis)
    }
}

fn saturating_millis(since_epoch: Duration) -> i64 {
    i64::try_from(since_epoch.as_millis()).unwrap_or(i64::MAX)
}

/// A clock that only moves when told to. Used by tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            millis: AtomicI64::new(start),
        }
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Timestamp for a new version of a key whose newest version is `latest`.
pub fn next_timestamp(now: Timestamp, latest: Option<Timestamp>) -> Timestamp {
    match latest {
        Some(latest) if latest > now => latest,
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_timestamp_never_goes_backwards() {
        let now = Timestamp::from_millis(100);
        assert_eq!(next_timestamp(now, None), now);
        assert_eq!(next_timestamp(now, Some(Timestamp::from_millis(50))), now);
        assert_eq!(
            next_timestamp(now, Some(Timestamp::from_millis(150))),
            Timestamp::from_millis(150)
        );
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.now(), Timestamp::from_millis(10));
        clock.advance(5);
        assert_eq!(clock.now(), Timestamp::from_millis(15));
        clock.set(1);
        assert_eq!(clock.now(), Timestamp::from_millis(1));
    }

    #[test]
    fn test_system_clock_is_after_epoch() {
        assert!(SystemClock.now().as_millis() > 0);
    }

    #[test]
    fn test_millis_saturate_instead_of_wrapping() {
        assert_eq!(saturating_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(saturating_millis(Duration::MAX), i64::MAX);
    }
}
