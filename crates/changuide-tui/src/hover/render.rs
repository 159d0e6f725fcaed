use changuide_core::api::{strip_tags, Channel};
use changuide_core::HoverConfig;

use crate::rating::{rating_count_line, StarRating};

/// Button row entry of a popover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopoverAction {
    Subscribe { hit_url: String, subscribe_url: String },
    Watch(String),
    Listen(String),
    MoreDetails(String),
}

impl PopoverAction {
    pub fn label(&self) -> &'static str {
        match self {
            PopoverAction::Subscribe { .. } => "Add to Sidebar",
            PopoverAction::Watch(_) => "Watch",
            PopoverAction::Listen(_) => "Listen",
            PopoverAction::MoreDetails(_) => "More Details",
        }
    }
}

/// Everything a popover displays, detached from any drawing backend
#[derive(Debug, Clone, PartialEq)]
pub struct PopoverView {
    pub title: String,
    pub actions: Vec<PopoverAction>,
    pub rating: StarRating,
    pub count_line: Option<String>,
    pub description: String,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
}

impl PopoverView {
    pub fn from_channel(channel: &Channel, config: &HoverConfig) -> Self {
        let mut actions = vec![PopoverAction::Subscribe {
            hit_url: channel.subscribe_hit_url.clone(),
            subscribe_url: channel.subscribe_url.clone(),
        }];
        if let Some(url) = channel.preview_url() {
            let url = url.to_string();
            actions.push(if channel.is_audio() {
                PopoverAction::Listen(url)
            } else {
                PopoverAction::Watch(url)
            });
        }
        actions.push(PopoverAction::MoreDetails(channel.details_url.clone()));

        Self {
            title: channel.name.clone(),
            actions,
            rating: StarRating::from_channel(channel),
            count_line: rating_count_line(channel),
            description: truncate_description(&strip_tags(&channel.description), config.description_limit),
            genres: channel.category.clone(),
            tags: channel.tag.iter().take(config.max_tags).cloned().collect(),
        }
    }

    /// "Genres - a, b" line, absent when the channel has none
    pub fn genres_line(&self) -> Option<String> {
        labelled_list("Genres", &self.genres)
    }

    pub fn tags_line(&self) -> Option<String> {
        labelled_list("Tags", &self.tags)
    }
}

fn labelled_list(label: &str, values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    Some(format!("{} - {}", label, values.join(", ")))
}

/// Cut after `limit` characters at the next space and mark the cut with "..."
///
/// Text without a space past the limit is kept whole.
pub fn truncate_description(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let start = text
        .char_indices()
        .nth(limit)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    match text[start..].find(' ') {
        Some(offset) => format!("{}...", &text[..start + offset]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::channel;
    use changuide_core::api::ChannelItem;

    #[test]
    fn test_truncate_at_next_space() {
        let text = format!("{} tail words", "x".repeat(290));
        let cut = truncate_description(&text, 285);
        assert_eq!(cut, format!("{}...", "x".repeat(290)));

        assert_eq!(truncate_description("short one", 285), "short one");
        let unbroken = "y".repeat(300);
        assert_eq!(truncate_description(&unbroken, 285), unbroken);
    }

    #[test]
    fn test_view_from_channel() {
        let mut c = channel(5, "Tiki Bar TV");
        c.description = "<p>Cocktails &amp; <b>sketches</b></p>".to_string();
        c.category = vec!["Comedy".into(), "Food".into()];
        c.tag = (1..=8).map(|i| format!("t{}", i)).collect();
        c.item = vec![ChannelItem {
            name: "ep".into(),
            playback_url: "http://media.example.com/ep.mov".into(),
            ..Default::default()
        }];

        let view = PopoverView::from_channel(&c, &HoverConfig::default());
        assert_eq!(view.title, "Tiki Bar TV");
        assert_eq!(view.description, "Cocktails &amp; sketches");
        assert_eq!(view.tags.len(), 5);
        assert_eq!(view.genres_line().unwrap(), "Genres - Comedy, Food");
        assert_eq!(
            view.actions.iter().map(|a| a.label()).collect::<Vec<_>>(),
            vec!["Add to Sidebar", "Watch", "More Details"]
        );
    }

    #[test]
    fn test_audio_channel_listens() {
        let mut c = channel(6, "Radio");
        c.details_url = "/audio/6".into();
        c.item = vec![ChannelItem {
            name: "ep".into(),
            playback_url: "/p/1".into(),
            ..Default::default()
        }];
        let view = PopoverView::from_channel(&c, &HoverConfig::default());
        assert_eq!(view.actions[1], PopoverAction::Listen("/p/1".into()));
        assert!(view.tags_line().is_none());
    }
}
