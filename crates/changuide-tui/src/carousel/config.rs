//! L4 Atomic Layer: Configuration helpers for the carousel
//!
//! Re-exports configuration from changuide-core and provides derived values.

use std::time::Duration;

pub use changuide_core::CarouselConfig;

use super::timing::total_steps;

/// Extension trait for CarouselConfig with utility methods
pub trait CarouselConfigExt {
    /// Delay between animation steps
    fn step_duration(&self) -> Duration;

    /// Idle delay before automatic rotation, `None` when disabled
    fn rotate_interval(&self) -> Option<Duration>;

    /// Number of steps in one rotation
    fn steps_per_rotation(&self) -> u32;

    /// Card width as a position unit
    fn item_width_f64(&self) -> f64;
}

impl CarouselConfigExt for CarouselConfig {
    #[inline]
    fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_ms.max(1))
    }

    #[inline]
    fn rotate_interval(&self) -> Option<Duration> {
        if self.rotate_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.rotate_interval_secs))
        }
    }

    #[inline]
    fn steps_per_rotation(&self) -> u32 {
        total_steps(self.time_step)
    }

    #[inline]
    fn item_width_f64(&self) -> f64 {
        f64::from(self.item_width)
    }
}
