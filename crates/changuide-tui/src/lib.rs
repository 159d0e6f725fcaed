pub mod app;
pub mod carousel;
pub mod event;
pub mod genre;
pub mod hover;
pub mod indicator;
pub mod input;
pub mod pager;
pub mod queue;
pub mod rating;
pub mod theme;
pub mod widgets;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{App, Command, Focus};
pub use theme::GruvboxMaterial;
