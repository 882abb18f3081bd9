use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" for window rollover detection.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used for replays and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn from_secs(secs: i64) -> Self {
        ManualClock {
            millis: AtomicI64::new(secs.saturating_mul(1_000)),
        }
    }

    pub fn set_secs(&self, secs: i64) {
        self.millis.store(secs.saturating_mul(1_000), Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        let delta = secs.saturating_mul(1_000);
        let _ = self
            .millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |millis| Some(millis.saturating_add(delta)));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::from_secs(119);
        assert_eq!(clock.now().timestamp(), 119);

        clock.advance_secs(2);
        assert_eq!(clock.now().timestamp(), 121);

        clock.set_secs(60);
        assert_eq!(clock.now().timestamp(), 60);
    }

    #[test]
    fn manual_clock_saturates_instead_of_overflowing() {
        let clock = ManualClock::from_secs(i64::MAX);
        assert_eq!(clock.millis.load(Ordering::SeqCst), i64::MAX);

        clock.set_secs(i64::MIN);
        assert_eq!(clock.millis.load(Ordering::SeqCst), i64::MIN);

        clock.set_secs(0);
        clock.advance_secs(i64::MAX);
        clock.advance_secs(i64::MAX);
        assert_eq!(clock.millis.load(Ordering::SeqCst), i64::MAX);

        // out of chrono's range, falls back to the epoch
        assert_eq!(clock.now().timestamp(), 0);
    }
}
