//! Per-channel detail memo with pending-set deduplication

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use changuide_core::api::{Channel, ChannelId};
use tracing::debug;

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Hit(Arc<Channel>),
    /// A fetch for this id is already running
    Pending,
    /// The caller now owns the fetch for this id
    Miss,
}

/// Session-lifetime detail cache
///
/// Populated entries are never replaced. An id is either absent, pending or
/// populated, and only the caller that saw `Miss` fetches it.
#[derive(Debug, Default)]
pub struct HoverCache {
    entries: HashMap<ChannelId, Arc<Channel>>,
    pending: HashSet<ChannelId>,
}

impl HoverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, id: ChannelId) -> Lookup {
        if let Some(channel) = self.entries.get(&id) {
            return Lookup::Hit(Arc::clone(channel));
        }
        if self.pending.insert(id) {
            debug!(id, "Hover detail miss");
            Lookup::Miss
        } else {
            Lookup::Pending
        }
    }

    /// Cached record without touching the pending set
    pub fn peek(&self, id: ChannelId) -> Option<Arc<Channel>> {
        self.entries.get(&id).cloned()
    }

    pub fn is_pending(&self, id: ChannelId) -> bool {
        self.pending.contains(&id)
    }

    /// Mark every uncached, non-pending id as pending and return them
    pub fn prefetch<I>(&mut self, ids: I) -> Vec<ChannelId>
    where
        I: IntoIterator<Item = ChannelId>,
    {
        let mut claimed = Vec::new();
        for id in ids {
            if !self.entries.contains_key(&id) && self.pending.insert(id) {
                claimed.push(id);
            }
        }
        claimed
    }

    /// Store a fetched record; an existing entry wins
    pub fn resolve(&mut self, channel: Channel) -> Arc<Channel> {
        let id = channel.id;
        self.pending.remove(&id);
        Arc::clone(
            self.entries
                .entry(id)
                .or_insert_with(|| Arc::new(channel)),
        )
    }

    /// Forget a failed fetch so a later hover can try again
    pub fn fail(&mut self, id: ChannelId) {
        self.pending.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
