//! Hover-triggered channel detail popovers
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `cache` - Detail memo with one fetch per id
//! - `render` - Pure popover content built from a channel record
//!
//! ## L3 Molecular Layer
//! - `popover` - Trigger/popover hand-off and stale response checks

// L4 Atomic Layer
pub mod cache;
pub mod render;

// L3 Molecular Layer
pub mod popover;

pub use cache::{HoverCache, Lookup};
pub use popover::{ApplyOutcome, Popover, PopoverController, Region, ShowAction, Side};
pub use render::{PopoverAction, PopoverView};
