//! Featured-channel carousel
//!
//! Rotates a strip of featured channel cards with eased, step-wise animation
//! and an idle auto-rotation timer.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing functions (cosine, cubic, quintic, exponential)
//! - `timing` - Deadline timers and interpolation
//! - `config` - Configuration re-exported from changuide-core plus derived values
//!
//! ## L3 Molecular Layer
//! - `animator` - Rotation state machine combining atoms
//!
//! # Usage
//!
//! ```ignore
//! use changuide_tui::carousel::{CarouselAnimator, CarouselConfig};
//!
//! let mut carousel = CarouselAnimator::new(CarouselConfig::default(), featured.len());
//! carousel.schedule_rotation(Instant::now());
//!
//! // user pressed "next"
//! carousel.rotate_right();
//!
//! // in the main loop
//! if carousel.tick(Instant::now()) {
//!     redraw(carousel.offset());
//! }
//! ```

// L4 Atomic Layer
pub mod config;
pub mod easing;
pub mod timing;

// L3 Molecular Layer
pub mod animator;

pub use animator::{CarouselAnimator, Direction, RotationPhase, Step};
pub use config::{CarouselConfig, CarouselConfigExt};
pub use easing::{EasingType, EasingTypeExt};
