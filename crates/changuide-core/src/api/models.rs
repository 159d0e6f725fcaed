use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type ChannelId = u64;

/// Channel record as returned by `/api/get_channel` and `/api/get_channels`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub hi_def: bool,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub details_url: String,
    #[serde(default)]
    pub subscribe_url: String,
    #[serde(default)]
    pub subscribe_hit_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default)]
    pub item: Vec<ChannelItem>,
    #[serde(default)]
    pub subscription_count_today: Option<u64>,
    #[serde(default)]
    pub subscription_count_month: Option<u64>,
    #[serde(default)]
    pub subscription_count: Option<u64>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub count_rating: Option<u64>,
    /// The current user's own rating, when logged in
    #[serde(default)]
    pub score: Option<f64>,
}

impl Channel {
    /// Audio channels get a "Listen" preview instead of "Watch"
    pub fn is_audio(&self) -> bool {
        self.details_url.contains("audio")
    }

    /// Playback URL of the newest item, if the channel has any
    pub fn preview_url(&self) -> Option<&str> {
        self.item.first().map(|i| i.playback_url.as_str())
    }
}

/// An episode within a channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelItem {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub playback_url: String,
    /// ISO-8601 timestamp without zone
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl ChannelItem {
    pub fn published(&self) -> Option<NaiveDateTime> {
        let date = self.date.as_deref()?;
        NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}

/// One result card extracted from a listing page fragment
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Channel id taken from the card's `hover_<id>` trigger, if present
    pub channel_id: Option<ChannelId>,
    pub title: String,
    /// Plain text rendering of the card
    pub text: String,
    /// Page anchor (`<a name="N">`) carried by the first card of a page
    pub anchor: Option<u32>,
}

/// One entry of a pagination control
#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub label: String,
    pub href: Option<String>,
    pub selected: bool,
}

/// Pagination control parsed from a listing page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paginator {
    pub links: Vec<PageLink>,
}

impl Paginator {
    /// Link following the selected entry, i.e. the next page
    pub fn next_href(&self) -> Option<&str> {
        let selected = self.links.iter().position(|l| l.selected)?;
        self.links.get(selected + 1)?.href.as_deref()
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.selected)
            .map(|l| l.label.as_str())
    }
}

/// Parsed listing page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFragment {
    pub items: Vec<ListItem>,
    pub paginator: Option<Paginator>,
    pub next_page_url: Option<String>,
}

/// Sort order accepted by `/api/get_channels`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSort {
    Popular,
    Newest,
    Rating,
}

impl ChannelSort {
    pub fn as_param(&self) -> &'static str {
        match self {
            ChannelSort::Popular => "-popular",
            ChannelSort::Newest => "-age",
            ChannelSort::Rating => "-rating",
        }
    }
}

/// Filtered channel listing request
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelQuery {
    pub filter: String,
    pub value: String,
    pub sort: ChannelSort,
    pub limit: usize,
}

impl ChannelQuery {
    pub fn category(genre: &str, sort: ChannelSort, limit: usize) -> Self {
        Self {
            filter: "category".to_string(),
            value: genre.to_string(),
            sort,
            limit,
        }
    }

    pub fn featured(limit: usize) -> Self {
        Self {
            filter: "featured".to_string(),
            value: "1".to_string(),
            sort: ChannelSort::Popular,
            limit,
        }
    }
}

/// Download queue status reported by the aether endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Queued,
    Unqueued,
}

/// Channel subscription status reported by the aether endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Subscribed,
    Unsubscribed,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusReply<T> {
    pub status: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_deserialize_minimal() {
        let channel: Channel = serde_json::from_str(
            r#"{"id": 7, "name": "Rocketboom", "category": ["News"], "tag": ["daily"]}"#,
        )
        .unwrap();
        assert_eq!(channel.id, 7);
        assert_eq!(channel.category, vec!["News".to_string()]);
        assert!(channel.score.is_none());
        assert!(channel.preview_url().is_none());
    }

    #[test]
    fn test_audio_detection() {
        let mut channel: Channel =
            serde_json::from_str(r#"{"id": 1, "name": "x", "details_url": "/audio/1"}"#).unwrap();
        assert!(channel.is_audio());
        channel.details_url = "/feeds/1".to_string();
        assert!(!channel.is_audio());
    }

    #[test]
    fn test_item_published() {
        let item: ChannelItem = serde_json::from_str(
            r#"{"name": "ep1", "playback_url": "/p/1", "date": "2008-05-01T12:30:00"}"#,
        )
        .unwrap();
        let published = item.published().unwrap();
        assert_eq!(published.format("%Y-%m-%d").to_string(), "2008-05-01");
    }

    #[test]
    fn test_paginator_next_href() {
        let paginator = Paginator {
            links: vec![
                PageLink { label: "1".into(), href: Some("/p?page=1".into()), selected: false },
                PageLink { label: "2".into(), href: None, selected: true },
                PageLink { label: "3".into(), href: Some("/p?page=3".into()), selected: false },
            ],
        };
        assert_eq!(paginator.next_href(), Some("/p?page=3"));
        assert_eq!(paginator.selected_label(), Some("2"));

        let last = Paginator {
            links: vec![PageLink { label: "3".into(), href: None, selected: true }],
        };
        assert_eq!(last.next_href(), None);
    }

    #[test]
    fn test_queue_status_wire_format() {
        let reply: StatusReply<QueueStatus> = serde_json::from_str(r#"{"status": "queued"}"#).unwrap();
        assert_eq!(reply.status, QueueStatus::Queued);
    }
}
