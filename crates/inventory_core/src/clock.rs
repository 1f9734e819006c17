//! Wall-clock source for `last_modified` stamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies the current time as Unix epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        // A clock set before 1970 collapses to epoch zero.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}
