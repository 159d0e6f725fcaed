use std::time::Duration;

use anyhow::Result;
use changuide_core::api::{Channel, ChannelId, PageFragment, QueueStatus, SubscriptionStatus};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};

use crate::genre::Listing;
use crate::pager::PageRequest;

/// Event handler for terminal events
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll with a shorter timeout, e.g. while an animation is running
    pub fn next_within(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if event::poll(timeout.min(self.tick_rate))? {
            match event::read()? {
                Event::Key(key) => {
                    // crossterm reports releases too on some platforms
                    if key.kind == KeyEventKind::Press {
                        Ok(Some(AppEvent::Key(key)))
                    } else {
                        Ok(None)
                    }
                }
                Event::Mouse(mouse) => Ok(Some(AppEvent::Mouse(mouse))),
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Pointer moved, clicked or scrolled
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Tick event for periodic updates
    Tick,
}

/// Completed background fetch, sent back to the main loop
#[derive(Debug)]
pub enum FetchResult {
    Featured(changuide_core::Result<Vec<Channel>>),
    Page {
        request: PageRequest,
        result: changuide_core::Result<PageFragment>,
    },
    Detail {
        id: ChannelId,
        result: changuide_core::Result<Channel>,
    },
    Prefetch {
        ids: Vec<ChannelId>,
        result: changuide_core::Result<Vec<Channel>>,
    },
    GenreListing {
        generation: u64,
        listing: Listing,
        result: changuide_core::Result<Vec<Channel>>,
    },
    GenreDetail {
        generation: u64,
        index: usize,
        result: changuide_core::Result<Channel>,
    },
    Rated {
        channel_id: ChannelId,
        star: u8,
        result: changuide_core::Result<()>,
    },
    /// Subscribe click registered; the URL to open next
    Subscribed {
        subscribe_url: String,
        result: changuide_core::Result<String>,
    },
    Queued {
        item_id: u64,
        result: changuide_core::Result<QueueStatus>,
    },
    SubscriptionChanged {
        channel_id: ChannelId,
        result: changuide_core::Result<SubscriptionStatus>,
    },
}
