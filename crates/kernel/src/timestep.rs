use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source for the scheduler.
pub trait Clock {
    /// Time elapsed since some fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and give the other to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Highest frame cap that still gives a step of at least one nanosecond.
pub const MAX_FRAME_CAP: u32 = 1_000_000_000;

/// Fixed-step accumulator with a per-frame step cap.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
    max_steps: u32,
}

impl FixedTimestep {
    /// Step length is `1 / frame_cap` seconds in whole nanoseconds, never
    /// shorter than one nanosecond.
    pub fn new(frame_cap: u32, max_steps: u32) -> Self {
        let frame_cap = u64::from(frame_cap.max(1));
        Self {
            step: Duration::from_nanos((1_000_000_000 / frame_cap).max(1)),
            accumulator: Duration::ZERO,
            max_steps: max_steps.max(1),
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }

    pub fn accumulate(&mut self, elapsed: Duration) {
        self.accumulator += elapsed;
    }

    /// Take one step out of the accumulator if a whole step is there.
    pub fn consume(&mut self) -> bool {
        if self.accumulator >= self.step {
            self.accumulator -= self.step;
            true
        } else {
            false
        }
    }

    /// Drop every whole step still queued, keeping the sub-step remainder.
    /// Returns how many steps were dropped.
    pub fn discard_backlog(&mut self) -> u64 {
        let step = self.step.as_nanos();
        let queued = self.accumulator.as_nanos();
        let dropped = queued / step;
        if dropped > 0 {
            self.accumulator = Duration::from_nanos((queued % step) as u64);
        }
        dropped as u64
    }

    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_whole_nanoseconds() {
        let ts = FixedTimestep::new(60, 5);
        assert_eq!(ts.step(), Duration::from_nanos(16_666_666));
        assert!((ts.step_secs() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn fifty_ms_holds_three_steps() {
        let mut ts = FixedTimestep::new(60, 5);
        ts.accumulate(Duration::from_millis(50));
        let mut steps = 0;
        while ts.consume() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!(ts.accumulated() < ts.step());
    }

    #[test]
    fn exactly_one_step_is_consumed() {
        let mut ts = FixedTimestep::new(60, 5);
        ts.accumulate(ts.step());
        assert!(ts.consume());
        assert_eq!(ts.accumulated(), Duration::ZERO);
        assert!(!ts.consume());
    }

    #[test]
    fn discard_keeps_the_remainder() {
        let mut ts = FixedTimestep::new(10, 5);
        ts.accumulate(Duration::from_millis(1250));
        assert_eq!(ts.discard_backlog(), 12);
        assert_eq!(ts.accumulated(), Duration::from_millis(50));
        assert_eq!(ts.discard_backlog(), 0);
    }

    #[test]
    fn reset_empties_the_accumulator() {
        let mut ts = FixedTimestep::new(60, 5);
        ts.accumulate(Duration::from_secs(3));
        ts.reset();
        assert!(!ts.consume());
    }

    #[test]
    fn zero_frame_cap_and_cap_are_clamped() {
        let ts = FixedTimestep::new(0, 0);
        assert_eq!(ts.step(), Duration::from_secs(1));
        assert_eq!(ts.max_steps(), 1);
    }

    #[test]
    fn huge_frame_cap_keeps_a_one_nanosecond_step() {
        let mut ts = FixedTimestep::new(u32::MAX, 5);
        assert_eq!(ts.step(), Duration::from_nanos(1));

        ts.accumulate(Duration::from_nanos(10));
        let mut steps = 0;
        while steps < ts.max_steps() && ts.consume() {
            steps += 1;
        }
        assert_eq!(steps, 5);
        assert_eq!(ts.discard_backlog(), 5);
        assert_eq!(ts.accumulated(), Duration::ZERO);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_millis(20));
        assert_eq!(clock.now(), Duration::from_millis(20));
        handle.set(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(1));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
