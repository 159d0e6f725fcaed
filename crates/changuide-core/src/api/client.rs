use async_trait::async_trait;

use super::models::{
    Channel, ChannelId, ChannelQuery, PageFragment, QueueStatus, SubscriptionStatus,
};
use crate::Result;

/// Channel guide endpoints consumed by the interactive widgets
///
/// Implemented over HTTP by [`super::HttpGuideApi`]; tests substitute an
/// in-memory double.
#[async_trait]
pub trait GuideApi: Send + Sync {
    /// Fetch one channel's detail record
    async fn fetch_detail(&self, id: ChannelId) -> Result<Channel>;

    /// Fetch several detail records in one request
    async fn fetch_details(&self, ids: &[ChannelId]) -> Result<Vec<Channel>>;

    /// Fetch and parse a listing page
    async fn fetch_page(&self, url: &str) -> Result<PageFragment>;

    /// Register a subscription click and return the URL to navigate to
    async fn fetch_subscribe_redirect(&self, notify_url: &str) -> Result<String>;

    /// Filtered, sorted channel listing
    async fn fetch_channels(&self, query: &ChannelQuery) -> Result<Vec<Channel>>;

    /// Queue (or dequeue) an item for download
    async fn set_queued(&self, item_id: u64, queued: bool) -> Result<QueueStatus>;

    /// Subscribe to (or unsubscribe from) a channel
    async fn set_subscribed(&self, channel_id: ChannelId, subscribed: bool) -> Result<SubscriptionStatus>;

    /// Rate a channel from 0 (clear) to 5 stars
    async fn rate(&self, channel_id: ChannelId, rating: u8) -> Result<()>;
}
