//! Time source for the refresh loop.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Clock abstraction so the loop can be driven without real delays.
///
/// - now(): monotonic instant, used for interval scheduling
/// - wall_now(): wall-clock time, used for record timestamps and calendar fields
/// - sleep(): blocks for the given duration (implementations may simulate)
pub trait Clock {
    fn now(&self) -> Instant;
    fn wall_now(&self) -> DateTime<Utc>;
    fn sleep(&self, d: Duration);
}

/// Real-time clock backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}
