//! In-memory `GuideApi` double for async widget tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use changuide_core::api::{
    Channel, ChannelId, ChannelQuery, ListItem, PageFragment, QueueStatus, SubscriptionStatus,
};
use changuide_core::{Error, GuideApi, Result};

pub fn channel(id: ChannelId, name: &str) -> Channel {
    Channel {
        id,
        name: name.to_string(),
        description: format!("About {}", name),
        details_url: format!("/feeds/{}", id),
        subscribe_url: format!("http://subscribe.example.com/?url=feed{}", id),
        subscribe_hit_url: format!("/channels/subscribe-hit/{}", id),
        ..Default::default()
    }
}

pub fn list_item(id: ChannelId, title: &str) -> ListItem {
    ListItem {
        channel_id: Some(id),
        title: title.to_string(),
        text: title.to_string(),
        anchor: None,
    }
}

pub fn fragment(items: Vec<ListItem>, next_page_url: Option<&str>) -> PageFragment {
    PageFragment {
        items,
        paginator: None,
        next_page_url: next_page_url.map(str::to_string),
    }
}

#[derive(Default)]
pub struct MockApi {
    pub channels: Mutex<HashMap<ChannelId, Channel>>,
    pub pages: Mutex<VecDeque<Result<PageFragment>>>,
    pub listings: Mutex<VecDeque<Result<Vec<Channel>>>>,
    pub detail_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub queue_calls: AtomicUsize,
}

impl MockApi {
    pub fn with_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let api = Self::default();
        {
            let mut map = api.channels.lock().unwrap();
            for c in channels {
                map.insert(c.id, c);
            }
        }
        api
    }

    pub fn push_listing(&self, listing: Result<Vec<Channel>>) {
        self.listings.lock().unwrap().push_back(listing);
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuideApi for MockApi {
    async fn fetch_detail(&self, id: ChannelId) -> Result<Channel> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.channels
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(Error::ChannelNotFound(id))
    }

    async fn fetch_details(&self, ids: &[ChannelId]) -> Result<Vec<Channel>> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let map = self.channels.lock().unwrap();
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn fetch_page(&self, url: &str) -> Result<PageFragment> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other(format!("no page queued for {}", url))))
    }

    async fn fetch_subscribe_redirect(&self, notify_url: &str) -> Result<String> {
        Ok(format!("http://subscribe.example.com{}", notify_url))
    }

    async fn fetch_channels(&self, _query: &ChannelQuery) -> Result<Vec<Channel>> {
        self.listings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn set_queued(&self, _item_id: u64, queued: bool) -> Result<QueueStatus> {
        self.queue_calls.fetch_add(1, Ordering::SeqCst);
        Ok(if queued { QueueStatus::Queued } else { QueueStatus::Unqueued })
    }

    async fn set_subscribed(&self, _channel_id: ChannelId, subscribed: bool) -> Result<SubscriptionStatus> {
        Ok(if subscribed {
            SubscriptionStatus::Subscribed
        } else {
            SubscriptionStatus::Unsubscribed
        })
    }

    async fn rate(&self, _channel_id: ChannelId, _rating: u8) -> Result<()> {
        Ok(())
    }
}
