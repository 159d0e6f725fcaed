//! L4 Atomic Layer: Timers and interpolation for carousel animation
//!
//! The UI loop owns the clock. Timers here only remember a deadline and
//! report when it has passed, so everything stays deterministic in tests.

use std::time::{Duration, Instant};

/// One-shot deadline, re-armed explicitly by its owner
#[derive(Debug, Clone, Default)]
pub struct Timer {
    due: Option<Instant>,
}

impl Timer {
    /// Arm (or re-arm) the timer to fire `delay` after `now`
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.due
    }

    /// Returns true exactly once when the deadline has passed, disarming the timer
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Number of discrete steps needed to cover [0, 1] with the given step size
#[inline]
pub fn total_steps(time_step: f64) -> u32 {
    if time_step <= 0.0 || !time_step.is_finite() {
        return 1;
    }
    (1.0 / time_step).ceil().max(1.0) as u32
}
