//! Download queue and subscription toggles
//!
//! Each episode gets a queue toggle; the channel gets a subscription toggle.
//! Queue toggles only respond while the channel is subscribed.

use changuide_core::api::{ChannelId, QueueStatus, SubscriptionStatus};
use changuide_core::Result;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Unqueued,
    Queued,
    Updating,
    Error,
}

impl From<QueueStatus> for QueueState {
    fn from(status: QueueStatus) -> Self {
        match status {
            QueueStatus::Queued => QueueState::Queued,
            QueueStatus::Unqueued => QueueState::Unqueued,
        }
    }
}

/// How a queue toggle looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueBadge {
    pub label: &'static str,
    /// Accepts clicks
    pub active: bool,
    pub dimmed: bool,
}

pub fn render_queue(state: QueueState, sensitive: bool) -> QueueBadge {
    let (label, clickable) = match state {
        QueueState::Unqueued => ("Queue", true),
        QueueState::Queued => ("Queued", true),
        QueueState::Updating => ("Updating...", false),
        QueueState::Error => ("Error", true),
    };
    QueueBadge {
        label,
        active: clickable && sensitive,
        dimmed: !sensitive,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueToggle {
    pub item_id: u64,
    state: QueueState,
    sensitive: bool,
    /// Target of the last request, retried after an error
    requested: Option<bool>,
}

impl QueueToggle {
    pub fn new(item_id: u64, state: QueueState, sensitive: bool) -> Self {
        Self {
            item_id,
            state,
            sensitive,
            requested: None,
        }
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn badge(&self) -> QueueBadge {
        render_queue(self.state, self.sensitive)
    }

    /// Start a queue/dequeue request
    ///
    /// Returns the queued state to ask for, or `None` when the toggle does
    /// not accept clicks right now.
    pub fn begin(&mut self) -> Option<bool> {
        if !self.badge().active {
            return None;
        }
        let queue = match self.state {
            QueueState::Unqueued => true,
            QueueState::Queued => false,
            QueueState::Error => self.requested?,
            QueueState::Updating => return None,
        };
        debug!(item = self.item_id, queue, "Queue toggle updating");
        self.requested = Some(queue);
        self.state = QueueState::Updating;
        Some(queue)
    }

    pub fn finish(&mut self, result: Result<QueueStatus>) -> QueueState {
        self.state = match result {
            Ok(status) => {
                self.requested = None;
                status.into()
            }
            Err(e) => {
                warn!(item = self.item_id, "Queue request failed: {}", e);
                QueueState::Error
            }
        };
        self.state
    }
}

/// Channel subscription plus the queue toggles it governs
#[derive(Debug, Clone)]
pub struct SubscriptionPanel {
    pub channel_id: ChannelId,
    subscribed: bool,
    updating: bool,
    items: Vec<QueueToggle>,
}

impl SubscriptionPanel {
    pub fn new(channel_id: ChannelId, subscribed: bool, items: Vec<(u64, QueueState)>) -> Self {
        Self {
            channel_id,
            subscribed,
            updating: false,
            items: items
                .into_iter()
                .map(|(id, state)| QueueToggle::new(id, state, subscribed))
                .collect(),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// "Subscribe" or "Unsubscribe", whichever a click would do
    pub fn label(&self) -> &'static str {
        if self.subscribed {
            "Unsubscribe"
        } else {
            "Subscribe"
        }
    }

    pub fn items(&self) -> &[QueueToggle] {
        &self.items
    }

    pub fn item_mut(&mut self, item_id: u64) -> Option<&mut QueueToggle> {
        self.items.iter_mut().find(|t| t.item_id == item_id)
    }

    /// Start a subscribe/unsubscribe request, returning the wanted state
    pub fn begin(&mut self) -> Option<bool> {
        if self.updating {
            return None;
        }
        self.updating = true;
        Some(!self.subscribed)
    }

    /// Apply the server's answer; a failure leaves everything as it was
    pub fn finish(&mut self, result: Result<SubscriptionStatus>) {
        self.updating = false;
        match result {
            Ok(status) => {
                let subscribed = status == SubscriptionStatus::Subscribed;
                if subscribed != self.subscribed {
                    info!(channel = self.channel_id, subscribed, "Subscription changed");
                    for item in &mut self.items {
                        item.sensitive = !item.sensitive;
                    }
                }
                self.subscribed = subscribed;
            }
            Err(e) => {
                warn!(channel = self.channel_id, "Subscription request failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use changuide_core::Error;

    #[test]
    fn test_render_covers_every_state() {
        assert_eq!(render_queue(QueueState::Unqueued, true).label, "Queue");
        assert!(render_queue(QueueState::Queued, true).active);
        assert!(!render_queue(QueueState::Updating, true).active);
        assert!(render_queue(QueueState::Error, true).active);

        let dimmed = render_queue(QueueState::Queued, false);
        assert!(dimmed.dimmed);
        assert!(!dimmed.active);
    }

    #[test]
    fn test_queue_round_trip_through_updating() {
        let mut toggle = QueueToggle::new(10, QueueState::Unqueued, true);
        assert_eq!(toggle.begin(), Some(true));
        assert_eq!(toggle.state(), QueueState::Updating);
        assert_eq!(toggle.begin(), None);

        assert_eq!(toggle.finish(Ok(QueueStatus::Queued)), QueueState::Queued);
        assert_eq!(toggle.begin(), Some(false));
    }

    #[test]
    fn test_error_retries_same_request() {
        let mut toggle = QueueToggle::new(10, QueueState::Queued, true);
        assert_eq!(toggle.begin(), Some(false));
        toggle.finish(Err(Error::Status { status: 500, url: "/aether/dequeue/10".into() }));
        assert_eq!(toggle.state(), QueueState::Error);
        assert_eq!(toggle.begin(), Some(false));
    }

    #[test]
    fn test_insensitive_toggle_ignores_clicks() {
        let mut toggle = QueueToggle::new(10, QueueState::Unqueued, false);
        assert_eq!(toggle.begin(), None);
        assert_eq!(toggle.state(), QueueState::Unqueued);
    }

    #[test]
    fn test_subscription_flips_sensitivity() {
        let mut panel = SubscriptionPanel::new(
            3,
            false,
            vec![(1, QueueState::Unqueued), (2, QueueState::Queued)],
        );
        assert!(panel.items().iter().all(|t| !t.is_sensitive()));
        assert_eq!(panel.label(), "Subscribe");

        assert_eq!(panel.begin(), Some(true));
        assert_eq!(panel.begin(), None);
        panel.finish(Ok(SubscriptionStatus::Subscribed));

        assert!(panel.is_subscribed());
        assert_eq!(panel.label(), "Unsubscribe");
        assert!(panel.items().iter().all(|t| t.is_sensitive()));
    }

    #[test]
    fn test_failed_subscription_changes_nothing() {
        let mut panel = SubscriptionPanel::new(3, true, vec![(1, QueueState::Queued)]);
        panel.begin();
        panel.finish(Err(Error::Timeout("subscribe".into())));
        assert!(panel.is_subscribed());
        assert!(!panel.is_updating());
        assert!(panel.items()[0].is_sensitive());
    }

    #[test]
    fn test_unsubscribe_locks_queued_item() {
        let mut panel = SubscriptionPanel::new(3, true, vec![(1, QueueState::Unqueued)]);

        let toggle = panel.item_mut(1).unwrap();
        assert_eq!(toggle.begin(), Some(true));
        assert_eq!(toggle.finish(Ok(QueueStatus::Queued)), QueueState::Queued);

        assert_eq!(panel.begin(), Some(false));
        panel.finish(Ok(SubscriptionStatus::Unsubscribed));
        assert!(!panel.is_subscribed());
        assert!(!panel.items()[0].is_sensitive());
        assert_eq!(panel.item_mut(1).unwrap().begin(), None);
    }
}
