//! L3 Molecular Layer: Featured-channel carousel animator
//!
//! Combines easing, timers and configuration into the rotation state machine.
//! The UI loop calls `tick()` on every frame; the animator decides whether an
//! animation step or an automatic rotation is due.

use std::ops::Range;
use std::time::Instant;

use tracing::debug;

use super::config::{CarouselConfig, CarouselConfigExt};
use super::easing::{EasingType, EasingTypeExt};
use super::timing::{lerp, Timer};

/// Direction of automatic rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Observable phase of the animator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPhase {
    Idle,
    Animating { target_index: usize },
}

/// Result of a single animation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Offset moved along the eased path
    Moved(f64),
    /// Animation reached its end offset and the animator is idle again
    Finished(f64),
}

/// Active rotation state
#[derive(Debug, Clone)]
struct ActiveRotation {
    start_offset: f64,
    end_offset: f64,
    target_index: usize,
    /// Steps already applied; elapsed fraction is `step * time_step`
    step: u32,
}

/// Carousel rotation controller
///
/// Owns the visible offset of a horizontal strip of featured cards. At most
/// one animation runs at a time; rotation requests arriving mid-animation are
/// dropped. Once the user rotates manually, automatic rotation stops for the
/// rest of the session.
#[derive(Debug, Clone)]
pub struct CarouselAnimator {
    config: CarouselConfig,
    total_items: usize,
    current_index: usize,
    direction: Direction,
    offset: f64,
    animation: Option<ActiveRotation>,
    manual: bool,
    step_timer: Timer,
    idle_timer: Timer,
}

impl CarouselAnimator {
    pub fn new(config: CarouselConfig, total_items: usize) -> Self {
        Self {
            config,
            total_items,
            current_index: 0,
            direction: Direction::Forward,
            offset: 0.0,
            animation: None,
            manual: false,
            step_timer: Timer::default(),
            idle_timer: Timer::default(),
        }
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Replace the item count (e.g. once the featured list has loaded)
    ///
    /// Keeps the current index within bounds; an idle strip snaps to it.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.current_index = self.current_index.min(self.max_index());
        if self.animation.is_none() {
            self.offset = self.index_offset(self.current_index);
        }
    }

    #[inline]
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Highest index the strip may start at
    #[inline]
    pub fn max_index(&self) -> usize {
        self.total_items.saturating_sub(self.config.visible_count)
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Current visible offset
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// True once the user has rotated by hand
    #[inline]
    pub fn is_manual(&self) -> bool {
        self.manual
    }

    pub fn phase(&self) -> RotationPhase {
        match &self.animation {
            Some(anim) => RotationPhase::Animating {
                target_index: anim.target_index,
            },
            None => RotationPhase::Idle,
        }
    }

    /// Fraction of the running animation already applied, 0 when idle
    pub fn elapsed_fraction(&self) -> f64 {
        self.animation
            .as_ref()
            .map(|a| (f64::from(a.step) * self.config.time_step).min(1.0))
            .unwrap_or(0.0)
    }

    /// Whether an automatic rotation is scheduled
    pub fn is_rotation_scheduled(&self) -> bool {
        self.idle_timer.is_armed()
    }

    /// Earliest instant at which `tick()` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.animation.is_some() {
            return Some(self.step_timer.deadline().unwrap_or_else(Instant::now));
        }
        self.idle_timer.deadline()
    }

    /// Indices of the cards that intersect the viewport at the current offset
    pub fn visible_range(&self) -> Range<usize> {
        let width = self.config.item_width_f64();
        if width <= 0.0 || self.total_items == 0 {
            return 0..0;
        }
        let first = (self.offset / width).floor().max(0.0) as usize;
        let end = ((self.offset + width * self.config.visible_count as f64) / width).ceil() as usize;
        first.min(self.total_items)..end.min(self.total_items)
    }

    fn index_offset(&self, index: usize) -> f64 {
        index as f64 * self.config.item_width_f64()
    }

    fn clamp_index(&self, index: i64) -> usize {
        index.clamp(0, self.max_index() as i64) as usize
    }

    /// Start animating toward `target_index`
    ///
    /// The target is clamped to the valid range. Returns false (and changes
    /// nothing) while another animation is running.
    pub fn rotate_to(&mut self, target_index: usize) -> bool {
        if let Some(anim) = &self.animation {
            debug!(
                requested = target_index,
                running = anim.target_index,
                "Carousel busy, rotation dropped"
            );
            return false;
        }

        let target_index = target_index.min(self.max_index());
        debug!(from = self.current_index, to = target_index, "Carousel rotation started");

        self.animation = Some(ActiveRotation {
            start_offset: self.index_offset(self.current_index),
            end_offset: self.index_offset(target_index),
            target_index,
            step: 0,
        });
        // first step runs on the next tick
        self.step_timer.cancel();
        true
    }

    /// Rotate one page back and take manual control
    pub fn rotate_left(&mut self) -> bool {
        let target = self.clamp_index(self.current_index as i64 - self.config.page_size as i64);
        let started = self.rotate_to(target);
        self.cancel_rotation();
        started
    }

    /// Rotate one page forward and take manual control
    pub fn rotate_right(&mut self) -> bool {
        let target = self.clamp_index(self.current_index as i64 + self.config.page_size as i64);
        let started = self.rotate_to(target);
        self.cancel_rotation();
        started
    }

    /// Stop automatic rotation for good
    pub fn cancel_rotation(&mut self) {
        self.idle_timer.cancel();
        if !self.manual {
            debug!("Carousel switched to manual mode");
        }
        self.manual = true;
    }

    /// Arm the idle timer for the next automatic rotation
    ///
    /// Does nothing in manual mode or when automatic rotation is disabled.
    pub fn schedule_rotation(&mut self, now: Instant) {
        if self.manual {
            return;
        }
        if let Some(interval) = self.config.rotate_interval() {
            self.idle_timer.arm(now, interval);
        }
    }

    /// Next automatic target: one page in the current direction, bouncing at the ends
    pub fn pick_next(&mut self) -> usize {
        let next = self.current_index as i64 + self.config.page_size as i64 * self.direction.sign();
        let max = self.max_index() as i64;

        if next < 0 {
            self.direction = self.direction.reversed();
            return 0;
        }
        if next >= max {
            self.direction = self.direction.reversed();
            return max as usize;
        }
        next as usize
    }

    /// Apply one animation step
    ///
    /// Returns `None` when no animation is running.
    pub fn step(&mut self) -> Option<Step> {
        let total_steps = self.config.steps_per_rotation();
        let time_step = self.config.time_step;
        let easing: EasingType = self.config.easing;

        let anim = self.animation.as_mut()?;

        if anim.step < total_steps {
            let t = (f64::from(anim.step) * time_step).min(1.0);
            self.offset = lerp(anim.start_offset, anim.end_offset, easing.apply(t));
            anim.step += 1;
            return Some(Step::Moved(self.offset));
        }

        self.offset = anim.end_offset;
        self.current_index = anim.target_index;
        self.animation = None;
        debug!(index = self.current_index, "Carousel rotation finished");
        Some(Step::Finished(self.offset))
    }

    /// Advance timers; returns true if the visible offset may have changed
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.animation.is_some() {
            if self.step_timer.is_armed() && !self.step_timer.fire(now) {
                return false;
            }
            match self.step() {
                Some(Step::Moved(_)) => {
                    self.step_timer.arm(now, self.config.step_duration());
                }
                Some(Step::Finished(_)) => {
                    self.step_timer.cancel();
                    self.schedule_rotation(now);
                }
                None => {}
            }
            return true;
        }

        if self.idle_timer.fire(now) {
            let next = self.pick_next();
            debug!(next, "Automatic carousel rotation");
            return self.rotate_to(next);
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config() -> CarouselConfig {
        CarouselConfig {
            item_width: 242,
            visible_count: 3,
            page_size: 3,
            step_ms: 50,
            time_step: 0.1,
            rotate_interval_secs: 20,
            ..Default::default()
        }
    }

    fn run_to_end(animator: &mut CarouselAnimator) -> Vec<f64> {
        let mut offsets = Vec::new();
        while let Some(step) = animator.step() {
            match step {
                Step::Moved(offset) => offsets.push(offset),
                Step::Finished(offset) => {
                    offsets.push(offset);
                    break;
                }
            }
        }
        offsets
    }

    #[test]
    fn test_rotate_to_lands_exactly() {
        for target in 0..=9 {
            let mut animator = CarouselAnimator::new(config(), 12);
            assert!(animator.rotate_to(target));
            run_to_end(&mut animator);
            assert_eq!(animator.current_index(), target);
            assert_eq!(animator.offset(), target as f64 * 242.0);
            assert!(!animator.is_animating());
        }
    }

    #[test]
    fn test_target_is_clamped() {
        let mut animator = CarouselAnimator::new(config(), 6);
        animator.rotate_to(50);
        run_to_end(&mut animator);
        assert_eq!(animator.current_index(), 3);
        assert_eq!(animator.offset(), 3.0 * 242.0);
    }

    #[test]
    fn test_rotate_during_animation_is_dropped() {
        let mut animator = CarouselAnimator::new(config(), 12);
        assert!(animator.rotate_to(3));
        animator.step();
        animator.step();
        let offset = animator.offset();
        let fraction = animator.elapsed_fraction();

        assert!(!animator.rotate_to(9));
        assert_eq!(animator.phase(), RotationPhase::Animating { target_index: 3 });
        assert_eq!(animator.current_index(), 0);
        assert_eq!(animator.offset(), offset);
        assert_eq!(animator.elapsed_fraction(), fraction);

        run_to_end(&mut animator);
        assert_eq!(animator.current_index(), 3);
    }

    #[test]
    fn test_offsets_follow_cosine_path() {
        let mut animator = CarouselAnimator::new(config(), 6);
        animator.rotate_to(3);
        let offsets = run_to_end(&mut animator);

        // ten eased steps plus the final snap
        assert_eq!(offsets.len(), 11);
        assert_eq!(offsets[0], 0.0);
        let midpoint = 726.0 * (1.0 - (0.5 * std::f64::consts::PI).cos()) / 2.0;
        assert!((offsets[5] - midpoint).abs() < 1e-9);
        for pair in offsets.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert_eq!(*offsets.last().unwrap(), 726.0);
    }

    #[test]
    fn test_elapsed_fraction_monotonic_then_resets() {
        let mut animator = CarouselAnimator::new(config(), 6);
        animator.rotate_to(3);
        let mut prev = animator.elapsed_fraction();
        assert_eq!(prev, 0.0);
        while animator.is_animating() {
            animator.step();
            if animator.is_animating() {
                let now = animator.elapsed_fraction();
                assert!(now >= prev && now <= 1.0);
                prev = now;
            }
        }
        assert_eq!(animator.elapsed_fraction(), 0.0);
    }

    #[test]
    fn test_manual_left_right_six_items() {
        let mut animator = CarouselAnimator::new(config(), 6);
        animator.rotate_to(3);
        run_to_end(&mut animator);
        assert_eq!(animator.current_index(), 3);

        assert!(animator.rotate_left());
        run_to_end(&mut animator);
        assert_eq!(animator.current_index(), 0);
        assert_eq!(animator.offset(), 0.0);

        assert!(animator.rotate_right());
        run_to_end(&mut animator);
        assert_eq!(animator.current_index(), 3);
        assert!(animator.is_manual());
    }

    #[test]
    fn test_manual_rotation_never_rearms_idle_timer() {
        let start = Instant::now();
        let mut animator = CarouselAnimator::new(config(), 6);
        animator.schedule_rotation(start);
        assert!(animator.is_rotation_scheduled());

        animator.rotate_right();
        assert!(!animator.is_rotation_scheduled());

        let mut now = start;
        for _ in 0..20 {
            now += Duration::from_millis(50);
            animator.tick(now);
        }
        assert!(!animator.is_animating());
        assert!(!animator.is_rotation_scheduled());

        animator.schedule_rotation(now);
        assert!(!animator.is_rotation_scheduled());
    }

    #[test]
    fn test_idle_timer_triggers_rotation_and_rearms() {
        let start = Instant::now();
        let mut animator = CarouselAnimator::new(config(), 9);
        animator.schedule_rotation(start);

        assert!(!animator.tick(start + Duration::from_secs(19)));
        assert!(animator.tick(start + Duration::from_secs(20)));
        assert_eq!(animator.phase(), RotationPhase::Animating { target_index: 3 });

        let mut now = start + Duration::from_secs(20);
        while animator.is_animating() {
            now += Duration::from_millis(50);
            animator.tick(now);
        }
        assert_eq!(animator.current_index(), 3);
        assert!(animator.is_rotation_scheduled());
    }

    #[test]
    fn test_step_timer_respects_delay() {
        let start = Instant::now();
        let mut animator = CarouselAnimator::new(config(), 6);
        animator.rotate_to(3);

        assert!(animator.tick(start));
        let after_first = animator.elapsed_fraction();
        assert!(!animator.tick(start + Duration::from_millis(10)));
        assert_eq!(animator.elapsed_fraction(), after_first);
        assert!(animator.tick(start + Duration::from_millis(50)));
        assert!(animator.elapsed_fraction() > after_first);
    }

    #[test]
    fn test_pick_next_bounces() {
        let mut animator = CarouselAnimator::new(config(), 9);
        assert_eq!(animator.pick_next(), 3);
        animator.rotate_to(3);
        run_to_end(&mut animator);

        assert_eq!(animator.pick_next(), 6);
        assert_eq!(animator.direction(), Direction::Backward);
        animator.rotate_to(6);
        run_to_end(&mut animator);

        assert_eq!(animator.pick_next(), 3);
        animator.rotate_to(3);
        run_to_end(&mut animator);

        assert_eq!(animator.pick_next(), 0);
        assert_eq!(animator.direction(), Direction::Backward);
        animator.rotate_to(0);
        run_to_end(&mut animator);

        // moving past the start flips direction and stays put
        assert_eq!(animator.pick_next(), 0);
        assert_eq!(animator.direction(), Direction::Forward);
        assert_eq!(animator.pick_next(), 3);
    }

    #[test]
    fn test_fewer_items_than_visible() {
        let mut animator = CarouselAnimator::new(config(), 2);
        assert_eq!(animator.max_index(), 0);
        animator.rotate_right();
        run_to_end(&mut animator);
        assert_eq!(animator.current_index(), 0);
        assert_eq!(animator.visible_range(), 0..2);
    }

    #[test]
    fn test_visible_range_mid_animation() {
        let mut animator = CarouselAnimator::new(config(), 6);
        assert_eq!(animator.visible_range(), 0..3);
        animator.rotate_to(3);
        for _ in 0..5 {
            animator.step();
        }
        // offset is 726 * ease(0.4), roughly 250.8
        assert_eq!(animator.visible_range(), 1..5);
    }
}
