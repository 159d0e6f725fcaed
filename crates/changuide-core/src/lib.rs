pub mod api;
pub mod config;
pub mod error;

pub use api::{Channel, ChannelId, GuideApi, HttpGuideApi};
pub use config::{AppConfig, CarouselConfig, EasingType, HoverConfig, PagerConfig};
pub use error::{Error, FailureKind, Result};
