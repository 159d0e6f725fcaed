//! Popover lifecycle for hover triggers
//!
//! A trigger is a channel card in the listing; its popover shows the
//! channel's detail record. Moving the pointer from a trigger into its own
//! popover (and back) keeps the popover open.

use std::collections::HashMap;
use std::sync::Arc;

use changuide_core::api::{Channel, ChannelId};
use changuide_core::Result;
use tracing::{debug, warn};

use super::cache::{HoverCache, Lookup};

/// What the pointer is over, one entry per level of an ancestor chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Trigger(ChannelId),
    Popover(ChannelId),
    Other,
}

/// Which side of the trigger the popover opens on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Right of the midpoint opens to the right
    pub fn for_pointer(pointer_x: u16, viewport_width: u16) -> Self {
        if f32::from(pointer_x) > f32::from(viewport_width) / 2.0 {
            Side::Right
        } else {
            Side::Left
        }
    }
}

#[derive(Debug, Clone)]
pub struct Popover {
    pub side: Side,
    pub visible: bool,
    /// Set while the pointer is inside the popover itself
    pub pinned: bool,
    pub content: Option<Arc<Channel>>,
}

impl Popover {
    fn new(side: Side) -> Self {
        Self {
            side,
            visible: false,
            pinned: false,
            content: None,
        }
    }
}

/// What the caller has to do after `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowAction {
    /// Existing popover with content was revealed again
    Revealed,
    /// Content came from the cache and is visible now
    Rendered,
    /// Caller must fetch this id and hand the result to `apply_detail`
    Fetch(ChannelId),
    /// A fetch is already running; the popover fills when it lands
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The record landed in the popover the pointer is on
    Applied,
    /// Cached only; the pointer moved on or the popover was removed
    Stale,
    /// The fetch failed and the popover was discarded
    Removed,
}

#[derive(Debug, Default)]
pub struct PopoverController {
    cache: HoverCache,
    popovers: HashMap<ChannelId, Popover>,
    current: Option<ChannelId>,
}

impl PopoverController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &HoverCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut HoverCache {
        &mut self.cache
    }

    /// Trigger most recently hovered
    pub fn current(&self) -> Option<ChannelId> {
        self.current
    }

    pub fn popover(&self, id: ChannelId) -> Option<&Popover> {
        self.popovers.get(&id)
    }

    pub fn is_visible(&self, id: ChannelId) -> bool {
        self.popovers.get(&id).is_some_and(|p| p.visible)
    }

    /// The popover currently on screen, if any
    pub fn visible(&self) -> Option<(ChannelId, &Popover)> {
        self.popovers
            .iter()
            .find(|(_, p)| p.visible)
            .map(|(id, p)| (*id, p))
    }

    /// Pointer entered a trigger
    pub fn show(&mut self, id: ChannelId, pointer_x: u16, viewport_width: u16) -> ShowAction {
        self.current = Some(id);
        for (other, popover) in self.popovers.iter_mut() {
            if *other != id {
                popover.visible = false;
                popover.pinned = false;
            }
        }

        let popover = self
            .popovers
            .entry(id)
            .or_insert_with(|| Popover::new(Side::for_pointer(pointer_x, viewport_width)));
        if popover.content.is_some() {
            popover.visible = true;
            return ShowAction::Revealed;
        }

        match self.cache.get(id) {
            Lookup::Hit(channel) => {
                popover.content = Some(channel);
                popover.visible = true;
                ShowAction::Rendered
            }
            Lookup::Pending => ShowAction::Waiting,
            Lookup::Miss => ShowAction::Fetch(id),
        }
    }

    /// Pointer left a trigger for whatever `related` describes
    ///
    /// `related` is the ancestor chain of the element entered, innermost
    /// first. Returns whether the popover is still visible.
    pub fn hide(&mut self, id: ChannelId, related: &[Region]) -> bool {
        if related.contains(&Region::Popover(id)) {
            return self.is_visible(id);
        }

        if self.cache.is_pending(id) {
            debug!(id, "Dropping popover with a fetch in flight");
            self.popovers.remove(&id);
            return false;
        }

        match self.popovers.get_mut(&id) {
            Some(popover) if !popover.pinned => {
                popover.visible = false;
                false
            }
            Some(popover) => popover.visible,
            None => false,
        }
    }

    /// Pointer entered the popover itself
    pub fn popup_enter(&mut self, id: ChannelId) {
        if let Some(popover) = self.popovers.get_mut(&id) {
            popover.pinned = true;
            popover.visible = true;
        }
    }

    /// Pointer left the popover; stays open only when going back to its trigger
    pub fn popup_leave(&mut self, id: ChannelId, related: &[Region]) -> bool {
        let Some(popover) = self.popovers.get_mut(&id) else {
            return false;
        };
        popover.pinned = false;
        if !related.contains(&Region::Trigger(id)) {
            popover.visible = false;
        }
        popover.visible
    }

    /// Hand back the result of a `ShowAction::Fetch`
    pub fn apply_detail(&mut self, id: ChannelId, result: Result<Channel>) -> ApplyOutcome {
        match result {
            Ok(channel) => {
                let channel = self.cache.resolve(channel);
                self.fill(id, channel)
            }
            Err(e) => {
                warn!(id, "Hover detail failed: {}", e);
                self.cache.fail(id);
                self.popovers.remove(&id);
                ApplyOutcome::Removed
            }
        }
    }

    /// Claim the ids a batch prefetch should load
    pub fn prefetch<I>(&mut self, ids: I) -> Vec<ChannelId>
    where
        I: IntoIterator<Item = ChannelId>,
    {
        self.cache.prefetch(ids)
    }

    /// Hand back the result of a batch prefetch for `ids`
    pub fn apply_batch(&mut self, ids: &[ChannelId], result: Result<Vec<Channel>>) {
        match result {
            Ok(channels) => {
                for channel in channels {
                    let id = channel.id;
                    let channel = self.cache.resolve(channel);
                    if self.popovers.contains_key(&id) {
                        self.fill(id, channel);
                    }
                }
                // ids the server did not return can be retried on hover
                for id in ids {
                    if self.cache.is_pending(*id) {
                        self.cache.fail(*id);
                    }
                }
            }
            Err(e) => {
                warn!(count = ids.len(), "Hover prefetch failed: {}", e);
                for id in ids {
                    self.cache.fail(*id);
                }
            }
        }
    }

    fn fill(&mut self, id: ChannelId, channel: Arc<Channel>) -> ApplyOutcome {
        let is_current = self.current == Some(id);
        match self.popovers.get_mut(&id) {
            Some(popover) => {
                popover.content = Some(channel);
                if is_current {
                    popover.visible = true;
                    ApplyOutcome::Applied
                } else {
                    ApplyOutcome::Stale
                }
            }
            None => ApplyOutcome::Stale,
        }
    }

    /// Forget every popover, e.g. when the listing is replaced
    pub fn clear_popovers(&mut self) {
        self.popovers.clear();
        self.current = None;
    }
}
