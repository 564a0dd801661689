//! Tick timestamp clock.
//!
//! Frame timestamps are 100 ns ticks since the Unix epoch. The wall
//! clock is sampled once at construction and a monotonic clock runs
//! from there, so consecutive stamps always strictly increase even if
//! the system clock steps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Ticks per second (one tick = 100 ns).
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Monotonic tick clock anchored at the Unix epoch.
#[derive(Debug)]
pub struct TickClock {
    epoch_ticks: u64,
    started: Instant,
    last: AtomicU64,
}

impl TickClock {
    /// Create a clock anchored to the current wall time.
    pub fn new() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let epoch_ticks = (since_epoch.as_nanos() / 100) as u64;
        Self {
            epoch_ticks,
            started: Instant::now(),
            last: AtomicU64::new(0),
        }
    }

    /// Current timestamp in ticks, strictly increasing per call.
    pub fn now_ticks(&self) -> u64 {
        let candidate = self.epoch_ticks + (self.started.elapsed().as_nanos() / 100) as u64;
        // Two calls inside the same 100 ns window still get distinct stamps
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(prev + 1);
            match self
                .last
                .compare_exchange(prev, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_increasing() {
        let clock = TickClock::new();
        let mut prev = clock.now_ticks();
        for _ in 0..1000 {
            let now = clock.now_ticks();
            assert!(now > prev);
            prev = now;
        }
    }

    #[test]
    fn test_anchored_near_wall_clock() {
        let clock = TickClock::new();
        let wall_ticks = (SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
            / 100) as u64;

        let drift = clock.now_ticks().abs_diff(wall_ticks);
        // Within one second of the wall clock
        assert!(drift < TICKS_PER_SECOND);
    }
}
