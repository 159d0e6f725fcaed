mod client;
mod fragment;
mod http;
mod models;

pub use client::GuideApi;
pub use fragment::{parse_page_fragment, strip_tags};
pub use http::HttpGuideApi;
pub use models::{
    Channel, ChannelId, ChannelItem, ChannelQuery, ChannelSort, ListItem, PageFragment, PageLink,
    Paginator, QueueStatus, SubscriptionStatus,
};
