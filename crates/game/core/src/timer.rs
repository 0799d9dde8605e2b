//! Millisecond clocks driving status ticks and expiry.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// Point in time, in milliseconds since the timer's epoch.
///
/// Arithmetic saturates at the ends of the `i64` range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`.
    pub fn since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<i64> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: i64) -> Timestamp {
        Timestamp(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Source of the current time.
pub trait Timer {
    fn now(&self) -> Timestamp;
}

/// Monotonic wall clock measured from its creation.
#[derive(Clone, Copy, Debug)]
pub struct SystemTimer {
    start: Instant,
}

impl SystemTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for SystemTimer {
    fn now(&self) -> Timestamp {
        let elapsed = self.start.elapsed().as_millis();
        Timestamp(i64::try_from(elapsed).unwrap_or(i64::MAX))
    }
}

/// Externally advanced clock for simulations and tests.
///
/// Clones share the same time, so a handle kept outside the engine can move
/// the clock the engine reads.
#[derive(Clone, Debug, Default)]
pub struct SteppedTimer {
    now: Arc<AtomicI64>,
}

impl SteppedTimer {
    /// One second, the step taken by [`SteppedTimer::force_tick`].
    pub const TICK_MS: i64 = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(ms)),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn force_tick(&self) {
        self.advance(Self::TICK_MS);
    }
}

impl Timer for SteppedTimer {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_timer_clones_share_time() {
        let timer = SteppedTimer::new();
        let handle = timer.clone();
        handle.advance(250);
        handle.force_tick();
        assert_eq!(timer.now(), Timestamp(1250));

        timer.set(10);
        assert_eq!(handle.now().as_millis(), 10);
    }

    #[test]
    fn system_timer_is_monotonic() {
        let timer = SystemTimer::new();
        let a = timer.now();
        let b = timer.now();
        assert!(b >= a);
    }

    #[test]
    fn timestamp_arithmetic() {
        let t = Timestamp(1500) + 500;
        assert_eq!(t.since(Timestamp(1000)), 1000);
        assert_eq!(t.to_string(), "2000ms");
    }

    #[test]
    fn timestamp_addition_saturates() {
        assert_eq!(Timestamp(1000) + i64::MAX, Timestamp(i64::MAX));
        assert_eq!(Timestamp(i64::MIN).since(Timestamp(1)), i64::MIN);
    }

    #[test]
    fn stepped_timer_can_start_late() {
        let timer = SteppedTimer::starting_at(5000);
        timer.force_tick();
        assert_eq!(timer.now(), Timestamp(6000));
    }
}
