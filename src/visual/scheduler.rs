//! Time sources for visualization pauses
//!
//! Every highlight and update suspends the running script for a fixed interval.
//! The interpreter runs on a single logical thread, so a suspension is simply a
//! call to [`Scheduler::sleep`]:
//!
//! - [`VirtualScheduler`] advances a virtual clock without blocking. Runs finish
//!   instantly and the resulting timeline is replayed by the UI at the recorded
//!   timestamps. It also records every pause, which makes timing testable.
//! - [`ThreadScheduler`] blocks the calling thread for real, for headless runs
//!   that should play out in wall-clock time.

use std::fmt;
use std::time::{Duration, Instant};

/// A clock the visualizer suspends on
pub trait Scheduler: fmt::Debug {
    /// Time elapsed since the scheduler was created
    fn now(&self) -> Duration;

    /// Suspend the current task for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Deterministic clock that only moves when slept on
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    now: Duration,
    pauses: Vec<Duration>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pause requested so far, in order
    pub fn pauses(&self) -> &[Duration] {
        &self.pauses
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now = self.now.saturating_add(duration);
        self.pauses.push(duration);
    }
}

/// Wall-clock scheduler backed by `std::thread::sleep`
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    started: Instant,
}

impl ThreadScheduler {
    pub fn new() -> Self {
        ThreadScheduler {
            started: Instant::now(),
        }
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_advances_only_on_sleep() {
        let mut scheduler = VirtualScheduler::new();
        assert_eq!(scheduler.now(), Duration::ZERO);

        scheduler.sleep(Duration::from_millis(500));
        scheduler.sleep(Duration::from_millis(250));

        assert_eq!(scheduler.now(), Duration::from_millis(750));
        assert_eq!(
            scheduler.pauses(),
            &[Duration::from_millis(500), Duration::from_millis(250)]
        );
    }

    #[test]
    fn test_thread_scheduler_really_waits() {
        let mut scheduler = ThreadScheduler::new();
        scheduler.sleep(Duration::from_millis(5));
        assert!(scheduler.now() >= Duration::from_millis(5));
    }
}
