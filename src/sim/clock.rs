/// Time source for the simulation.
///
/// Every timestamp in the game is a `Duration` since the clock's epoch.
/// Power-up expiry, food spawn easing, the level banner and tick pacing
/// all read time through this trait so tests can drive it by hand.

use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Duration;
    fn sleep_until(&mut self, deadline: Duration);
}

pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { epoch: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Deterministic clock: only moves when told to (or when asked to sleep).
#[cfg(test)]
pub struct ManualClock {
    now: Duration,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: Duration) -> Self {
        ManualClock { now: start }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep_until(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

/// Fixed-rate tick scheduler. The interval may change every tick.
pub struct TickPacer {
    last_tick: Duration,
}

impl TickPacer {
    pub fn new(start: Duration) -> Self {
        TickPacer { last_tick: start }
    }

    /// Block until one `interval` after the previous tick.
    /// If we're already late, don't try to catch up: restart from now.
    pub fn wait<C: Clock + ?Sized>(&mut self, clock: &mut C, interval: Duration) -> Duration {
        let deadline = self.last_tick + interval;
        let now = clock.now();
        if now >= deadline {
            self.last_tick = now;
        } else {
            clock.sleep_until(deadline);
            self.last_tick = deadline;
        }
        self.last_tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn manual_clock_sleep_moves_forward_only() {
        let mut c = ManualClock::new(100 * MS);
        c.sleep_until(50 * MS);
        assert_eq!(c.now(), 100 * MS);
        c.sleep_until(250 * MS);
        assert_eq!(c.now(), 250 * MS);
    }

    #[test]
    fn pacer_keeps_fixed_cadence() {
        let mut c = ManualClock::new(Duration::ZERO);
        let mut p = TickPacer::new(Duration::ZERO);

        // Work inside the tick doesn't shift the boundaries
        c.advance(30 * MS);
        assert_eq!(p.wait(&mut c, 100 * MS), 100 * MS);
        c.advance(70 * MS);
        assert_eq!(p.wait(&mut c, 100 * MS), 200 * MS);
        assert_eq!(c.now(), 200 * MS);
    }

    #[test]
    fn pacer_resyncs_when_late() {
        let mut c = ManualClock::new(Duration::ZERO);
        let mut p = TickPacer::new(Duration::ZERO);
        c.advance(350 * MS);
        assert_eq!(p.wait(&mut c, 100 * MS), 350 * MS);
        assert_eq!(p.wait(&mut c, 50 * MS), 400 * MS);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut c = SystemClock::new();
        let a = c.now();
        c.sleep_until(a + 2 * MS);
        assert!(c.now() >= a + 2 * MS);
    }
}
