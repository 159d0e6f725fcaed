use std::sync::Arc;
use std::time::{Duration, Instant};

use changuide_core::api::{Channel, ChannelId, ChannelQuery};
use changuide_core::AppConfig;
use ratatui::layout::Rect;
use tracing::{debug, info, warn};
use url::Url;

use crate::carousel::{CarouselAnimator, CarouselConfigExt};
use crate::event::FetchResult;
use crate::genre::{GenreOutcome, GenreRequest, Listing, GenreBrowser};
use crate::hover::{PopoverController, PopoverView, Region, ShowAction};
use crate::indicator::LoadIndicator;
use crate::pager::{DebouncedPager, PageOutcome, PageRequest, ScrollMetrics};
use crate::queue::{QueueState, SubscriptionPanel};
use crate::rating::{rate_outcome, RateOutcome, StarRating};

/// Current focus panel in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Featured,
    Listing,
    Genres,
    Detail,
}

/// Side effect requested by the app, carried out by the main loop
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchFeatured(ChannelQuery),
    FetchPage(PageRequest),
    FetchDetail(ChannelId),
    Prefetch(Vec<ChannelId>),
    FetchGenreListing { request: GenreRequest, listing: Listing },
    FetchGenreDetail { generation: u64, index: usize, id: ChannelId },
    Rate { channel_id: ChannelId, star: u8 },
    /// Register the click on `hit_url`, then open `subscribe_url`
    Subscribe { hit_url: String, subscribe_url: String },
    Queue { item_id: u64, queue: bool },
    Subscription { channel_id: ChannelId, subscribe: bool },
    OpenUrl(String),
}

impl Command {
    /// Whether the command talks to the guide and shows the load indicator
    pub fn is_fetch(&self) -> bool {
        !matches!(self, Command::OpenUrl(_))
    }
}

/// Channel opened from the listing, with its episode queue toggles
#[derive(Debug, Clone)]
pub struct DetailView {
    pub channel: Arc<Channel>,
    pub panel: SubscriptionPanel,
    pub rating: StarRating,
    pub selected: usize,
}

impl DetailView {
    pub fn new(channel: Arc<Channel>) -> Self {
        let items = channel
            .item
            .iter()
            .filter_map(|item| item.id)
            .map(|id| (id, QueueState::Unqueued))
            .collect();
        Self {
            panel: SubscriptionPanel::new(channel.id, false, items),
            rating: StarRating::from_channel(&channel),
            channel,
            selected: 0,
        }
    }
}

/// Application state
pub struct App {
    /// Application configuration
    pub config: Arc<AppConfig>,
    pub focus: Focus,
    /// Featured channels shown in the carousel
    pub featured: Vec<Channel>,
    pub carousel: CarouselAnimator,
    pub pager: DebouncedPager,
    pub hover: PopoverController,
    pub genres: GenreBrowser,
    pub indicator: LoadIndicator,
    pub detail: Option<DetailView>,
    /// Rating widget of the popover on screen
    pub popover_rating: Option<StarRating>,
    pub selected_item: usize,
    pub selected_genre: usize,
    /// First visible row of the listing
    pub list_scroll: u32,
    pub list_viewport: Rect,
    pub screen_width: u16,
    /// Region under the pointer (or the keyboard selection)
    pub pointer: Region,
    /// Clickable regions recorded while drawing, topmost last
    pub hit_map: Vec<(Rect, Region)>,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
    pub ticks: u64,
    detail_pending: Option<ChannelId>,
    commands: Vec<Command>,
}

impl App {
    pub fn new(config: Arc<AppConfig>, genres: Vec<String>) -> Self {
        let start_page = Some(config.api.start_page.clone());
        Self {
            carousel: CarouselAnimator::new(config.carousel.clone(), 0),
            pager: DebouncedPager::new(config.pager.clone(), start_page),
            hover: PopoverController::new(),
            genres: GenreBrowser::new(genres),
            indicator: LoadIndicator::default(),
            focus: Focus::Listing,
            featured: Vec::new(),
            detail: None,
            popover_rating: None,
            selected_item: 0,
            selected_genre: 0,
            list_scroll: 0,
            list_viewport: Rect::default(),
            screen_width: 0,
            pointer: Region::Other,
            hit_map: Vec::new(),
            should_quit: false,
            status_message: None,
            ticks: 0,
            detail_pending: None,
            commands: Vec::new(),
            config,
        }
    }

    /// Queue the initial featured and listing fetches
    pub fn start(&mut self) {
        let limit = self.config.carousel.featured_limit;
        self.issue(Command::FetchFeatured(ChannelQuery::featured(limit)));
        if let Some(request) = self.pager.load_next_page() {
            self.issue(Command::FetchPage(request));
        }
    }

    fn issue(&mut self, command: Command) {
        if command.is_fetch() {
            self.indicator.start();
        }
        debug!(?command, "Command issued");
        self.commands.push(command);
    }

    /// Drain the commands issued since the last call
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Resolve a guide-relative link against the configured base URL
    pub fn absolute_url(&self, href: &str) -> String {
        Url::parse(&self.config.api.base_url)
            .and_then(|base| base.join(href))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string())
    }

    pub fn open_url(&mut self, url: String) {
        self.issue(Command::OpenUrl(url));
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear the status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    // Timers

    /// Advance animations; returns true when a redraw is needed
    pub fn tick(&mut self, now: Instant) -> bool {
        self.ticks = self.ticks.wrapping_add(1);
        self.carousel.tick(now) || self.indicator.is_visible()
    }

    /// How long the main loop may block waiting for input
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        let tick = Duration::from_millis(self.config.ui.tick_rate_ms);
        if self.carousel.is_animating() {
            return self.carousel.config().step_duration().min(tick);
        }
        match self.carousel.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(tick),
            None => tick,
        }
    }

    // Carousel

    pub fn carousel_left(&mut self) {
        self.carousel.rotate_left();
    }

    pub fn carousel_right(&mut self) {
        self.carousel.rotate_right();
    }

    /// Featured channels currently intersecting the strip
    pub fn visible_featured(&self) -> &[Channel] {
        let range = self.carousel.visible_range();
        let end = range.end.min(self.featured.len());
        &self.featured[range.start.min(end)..end]
    }

    // Listing scroll and paging

    pub fn scroll_metrics(&self) -> ScrollMetrics {
        let config = self.pager.config();
        let mut content = self.pager.items().len() as u32 * config.item_height;
        if self.pager.paginator().is_some() || self.pager.next_page_url().is_some() {
            content += config.paginator_height;
        }
        ScrollMetrics {
            content_height: content,
            scroll_top: self.list_scroll,
            viewport_height: u32::from(self.list_viewport.height),
        }
    }

    /// Record the listing area after layout; may trigger a page fetch
    pub fn set_list_viewport(&mut self, area: Rect, screen_width: u16) {
        self.screen_width = screen_width;
        if self.list_viewport != area {
            self.list_viewport = area;
            self.check_scroll();
        }
    }

    fn check_scroll(&mut self) {
        if let Some(request) = self.pager.on_scroll(self.scroll_metrics()) {
            self.issue(Command::FetchPage(request));
        }
    }

    /// Retry or force the next page
    pub fn load_more(&mut self) {
        match self.pager.load_next_page() {
            Some(request) => {
                self.clear_status();
                self.issue(Command::FetchPage(request));
            }
            None if self.pager.next_page_url().is_none() => self.set_status("No more pages"),
            None => {}
        }
    }

    pub fn scroll_by(&mut self, rows: i32) {
        let metrics = self.scroll_metrics();
        let max = metrics.content_height.saturating_sub(metrics.viewport_height);
        self.list_scroll = (i64::from(self.list_scroll) + i64::from(rows)).clamp(0, i64::from(max)) as u32;
        self.check_scroll();
    }

    fn ensure_selection_visible(&mut self) {
        let item_height = self.pager.config().item_height;
        let top = self.selected_item as u32 * item_height;
        let bottom = top + item_height;
        let viewport = u32::from(self.list_viewport.height);
        if top < self.list_scroll {
            self.list_scroll = top;
        } else if bottom > self.list_scroll + viewport {
            self.list_scroll = bottom.saturating_sub(viewport);
        }
        self.check_scroll();
    }

    /// Move selection down in the current panel
    pub fn move_down(&mut self) {
        match self.focus {
            Focus::Listing => {
                let len = self.pager.items().len();
                if len > 0 && self.selected_item < len - 1 {
                    self.selected_item += 1;
                }
                self.ensure_selection_visible();
                self.hover_selected();
            }
            Focus::Genres => {
                let len = self.genres.genres().len();
                if len > 0 && self.selected_genre < len - 1 {
                    self.selected_genre += 1;
                }
            }
            Focus::Detail => {
                if let Some(detail) = &mut self.detail {
                    let len = detail.panel.items().len();
                    if len > 0 && detail.selected < len - 1 {
                        detail.selected += 1;
                    }
                }
            }
            Focus::Featured => self.carousel_right(),
        }
    }

    /// Move selection up in the current panel
    pub fn move_up(&mut self) {
        match self.focus {
            Focus::Listing => {
                self.selected_item = self.selected_item.saturating_sub(1);
                self.ensure_selection_visible();
                self.hover_selected();
            }
            Focus::Genres => self.selected_genre = self.selected_genre.saturating_sub(1),
            Focus::Detail => {
                if let Some(detail) = &mut self.detail {
                    detail.selected = detail.selected.saturating_sub(1);
                }
            }
            Focus::Featured => self.carousel_left(),
        }
    }

    pub fn page_down(&mut self) {
        let rows = i32::from(self.list_viewport.height.max(1));
        let item_height = self.pager.config().item_height.max(1) as usize;
        let jump = (rows as usize / item_height).max(1);
        let len = self.pager.items().len();
        self.selected_item = (self.selected_item + jump).min(len.saturating_sub(1));
        self.scroll_by(rows);
        self.ensure_selection_visible();
        self.hover_selected();
    }

    pub fn page_up(&mut self) {
        let rows = i32::from(self.list_viewport.height.max(1));
        let item_height = self.pager.config().item_height.max(1) as usize;
        let jump = (rows as usize / item_height).max(1);
        self.selected_item = self.selected_item.saturating_sub(jump);
        self.scroll_by(-rows);
        self.ensure_selection_visible();
        self.hover_selected();
    }

    /// Cycle focus through the panels
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Featured => Focus::Listing,
            Focus::Listing => Focus::Genres,
            Focus::Genres if self.detail.is_some() => Focus::Detail,
            Focus::Genres | Focus::Detail => Focus::Featured,
        };
        if self.focus != Focus::Listing {
            self.move_pointer(Region::Other, &[Region::Other], 0);
        }
    }

    /// Label of the listing page the selection is on
    pub fn current_page_label(&self) -> Option<String> {
        if let Some(page) = self.pager.page_for_index(self.selected_item) {
            return Some(page.to_string());
        }
        self.pager
            .paginator()
            .and_then(|p| p.selected_label())
            .map(str::to_string)
    }

    // Hover popovers

    fn selected_channel_id(&self) -> Option<ChannelId> {
        self.pager.items().get(self.selected_item)?.channel_id
    }

    /// Treat the keyboard selection like the pointer resting on its card
    pub fn hover_selected(&mut self) {
        let region = match self.selected_channel_id() {
            Some(id) => Region::Trigger(id),
            None => Region::Other,
        };
        let x = self.list_viewport.x + self.list_viewport.width / 4;
        self.move_pointer(region, &[region], x);
    }

    /// Ancestor chain of whatever is drawn at (x, y), innermost first
    pub fn regions_at(&self, x: u16, y: u16) -> Vec<Region> {
        let mut chain: Vec<Region> = self
            .hit_map
            .iter()
            .rev()
            .filter(|(rect, _)| {
                x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
            })
            .map(|(_, region)| *region)
            .collect();
        chain.push(Region::Other);
        chain
    }

    /// Pointer moved to (x, y)
    pub fn pointer_moved(&mut self, x: u16, y: u16) {
        let chain = self.regions_at(x, y);
        let target = chain
            .iter()
            .copied()
            .find(|r| *r != Region::Other)
            .unwrap_or(Region::Other);
        self.move_pointer(target, &chain, x);
    }

    fn move_pointer(&mut self, target: Region, chain: &[Region], x: u16) {
        let previous = self.pointer;
        if previous == target {
            return;
        }
        match previous {
            Region::Trigger(id) => {
                self.hover.hide(id, chain);
            }
            Region::Popover(id) => {
                self.hover.popup_leave(id, chain);
            }
            Region::Other => {}
        }
        match target {
            Region::Trigger(id) => {
                if let ShowAction::Fetch(id) = self.hover.show(id, x, self.screen_width) {
                    self.issue(Command::FetchDetail(id));
                }
            }
            Region::Popover(id) => self.hover.popup_enter(id),
            Region::Other => {}
        }
        self.pointer = target;
        self.sync_popover_rating();
    }

    fn sync_popover_rating(&mut self) {
        let visible = self
            .hover
            .visible()
            .and_then(|(_, popover)| popover.content.clone());
        self.popover_rating = match (visible, self.popover_rating.take()) {
            (Some(channel), Some(rating)) if rating.channel_id == channel.id => Some(rating),
            (Some(channel), _) => Some(StarRating::from_channel(&channel)),
            (None, _) => None,
        };
    }

    /// Content of the popover on screen
    pub fn popover_view(&self) -> Option<(ChannelId, PopoverView)> {
        let (id, popover) = self.hover.visible()?;
        let channel = popover.content.as_ref()?;
        let mut view = PopoverView::from_channel(channel, &self.config.hover);
        if let Some(rating) = &self.popover_rating {
            view.rating = rating.clone();
        }
        Some((id, view))
    }

    /// Channel the user is acting on: the open detail view or the popover
    fn target_channel(&self) -> Option<Arc<Channel>> {
        if self.focus == Focus::Detail {
            if let Some(detail) = &self.detail {
                return Some(Arc::clone(&detail.channel));
            }
        }
        self.hover
            .visible()
            .and_then(|(_, popover)| popover.content.clone())
    }

    // Actions

    pub fn rate(&mut self, star: u8) {
        let star = if self.focus == Focus::Detail {
            self.detail.as_mut().map(|d| (d.channel.id, d.rating.click(star)))
        } else {
            self.popover_rating.as_mut().map(|r| (r.channel_id, r.click(star)))
        };
        match star {
            Some((channel_id, star)) => self.issue(Command::Rate { channel_id, star }),
            None => self.set_status("Hover a channel to rate it"),
        }
    }

    pub fn subscribe(&mut self) {
        let Some(channel) = self.target_channel() else {
            self.set_status("Hover a channel to subscribe");
            return;
        };
        info!(channel = channel.id, "Subscribing via guide");
        self.issue(Command::Subscribe {
            hit_url: self.absolute_url(&channel.subscribe_hit_url),
            subscribe_url: self.absolute_url(&channel.subscribe_url),
        });
    }

    pub fn open_preview(&mut self) {
        let url = self
            .target_channel()
            .and_then(|c| c.preview_url().map(str::to_string));
        match url {
            Some(url) => {
                let url = self.absolute_url(&url);
                self.issue(Command::OpenUrl(url));
            }
            None => self.set_status("Nothing to preview"),
        }
    }

    /// Open the selected listing entry in the detail panel
    pub fn open_detail(&mut self) {
        let Some(id) = self.selected_channel_id() else {
            return;
        };
        match self.hover.cache().peek(id) {
            Some(channel) => {
                self.detail = Some(DetailView::new(channel));
                self.focus = Focus::Detail;
            }
            None => {
                self.detail_pending = Some(id);
                if !self.hover.cache().is_pending(id) {
                    self.hover.cache_mut().get(id);
                    self.issue(Command::FetchDetail(id));
                }
            }
        }
    }

    /// Open the detail panel waiting on a channel once it is cached
    ///
    /// A batch reply that left the channel out releases it; fetch it alone.
    fn open_pending_detail(&mut self) {
        let Some(id) = self.detail_pending else {
            return;
        };
        if let Some(channel) = self.hover.cache().peek(id) {
            self.detail_pending = None;
            self.detail = Some(DetailView::new(channel));
            self.focus = Focus::Detail;
        } else if !self.hover.cache().is_pending(id) {
            self.hover.cache_mut().get(id);
            self.issue(Command::FetchDetail(id));
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.detail_pending = None;
        if self.focus == Focus::Detail {
            self.focus = Focus::Listing;
        }
    }

    pub fn open_details_page(&mut self) {
        if let Some(channel) = self.target_channel() {
            let url = self.absolute_url(&channel.details_url);
            self.issue(Command::OpenUrl(url));
        }
    }

    pub fn toggle_queue(&mut self) {
        let Some(detail) = &mut self.detail else {
            return;
        };
        let Some(item_id) = detail.panel.items().get(detail.selected).map(|t| t.item_id) else {
            return;
        };
        let queue = detail.panel.item_mut(item_id).and_then(|toggle| toggle.begin());
        match queue {
            Some(queue) => self.issue(Command::Queue { item_id, queue }),
            None => self.set_status("Subscribe to the channel to queue episodes"),
        }
    }

    pub fn toggle_subscription(&mut self) {
        let Some(detail) = &mut self.detail else {
            return;
        };
        let channel_id = detail.channel.id;
        if let Some(subscribe) = detail.panel.begin() {
            self.issue(Command::Subscription { channel_id, subscribe });
        }
    }

    /// Load the genre under the cursor into the browser slots
    pub fn select_genre(&mut self) {
        let Some(genre) = self.genres.genres().get(self.selected_genre).cloned() else {
            return;
        };
        let request = self.genres.select(&genre);
        self.issue(Command::FetchGenreListing {
            request: request.clone(),
            listing: Listing::Popular,
        });
        self.issue(Command::FetchGenreListing {
            request,
            listing: Listing::Newest,
        });
    }

    pub fn open_genre_listing(&mut self) {
        if let Some(href) = self.genres.view_all_href() {
            info!(href = %href, "Switching listing to genre");
            self.pager.reset(Some(href));
            self.hover.clear_popovers();
            self.pointer = Region::Other;
            self.popover_rating = None;
            self.selected_item = 0;
            self.list_scroll = 0;
            self.focus = Focus::Listing;
            self.load_more();
        }
    }

    // Fetch results

    /// Apply a completed fetch
    pub fn apply(&mut self, result: FetchResult) {
        self.indicator.stop();
        match result {
            FetchResult::Featured(Ok(channels)) => {
                info!(count = channels.len(), "Featured channels loaded");
                self.carousel.set_total_items(channels.len());
                self.featured = channels;
                self.carousel.schedule_rotation(Instant::now());
            }
            FetchResult::Featured(Err(e)) => {
                warn!("Featured channels failed: {}", e);
                self.set_status(format!("Featured channels unavailable: {}", e));
            }
            FetchResult::Page { request, result } => self.apply_page(&request, result),
            FetchResult::Detail { id, result } => {
                self.hover.apply_detail(id, result);
                if self.detail_pending == Some(id) && self.hover.cache().peek(id).is_none() {
                    self.detail_pending = None;
                    self.set_status(format!("Could not load channel {}", id));
                }
                self.open_pending_detail();
                self.sync_popover_rating();
            }
            FetchResult::Prefetch { ids, result } => {
                self.hover.apply_batch(&ids, result);
                self.open_pending_detail();
                self.sync_popover_rating();
            }
            FetchResult::GenreListing {
                generation,
                listing,
                result,
            } => {
                let (outcome, wanted) = self.genres.apply_listing(generation, listing, result);
                if outcome == GenreOutcome::Failed {
                    self.set_status("Genre listing failed");
                }
                for (index, id) in wanted {
                    self.issue(Command::FetchGenreDetail { generation, index, id });
                }
            }
            FetchResult::GenreDetail {
                generation,
                index,
                result,
            } => {
                self.genres.apply_detail(generation, index, result);
            }
            FetchResult::Rated {
                channel_id,
                star,
                result,
            } => match rate_outcome(channel_id, star, result) {
                RateOutcome::Saved(star) => self.set_status(format!("Rated {} stars", star)),
                RateOutcome::LoginRequired(url) => {
                    self.set_status("Log in to rate channels");
                    self.issue(Command::OpenUrl(url));
                }
                RateOutcome::Failed(e) => self.set_status(format!("Rating failed: {}", e)),
            },
            FetchResult::Subscribed {
                subscribe_url,
                result,
            } => {
                if let Err(e) = result {
                    warn!("Subscribe hit failed: {}", e);
                }
                self.issue(Command::OpenUrl(subscribe_url));
            }
            FetchResult::Queued { item_id, result } => {
                if let Some(toggle) = self
                    .detail
                    .as_mut()
                    .and_then(|d| d.panel.item_mut(item_id))
                {
                    if toggle.finish(result) == QueueState::Error {
                        self.set_status("Queue request failed");
                    }
                }
            }
            FetchResult::SubscriptionChanged { channel_id, result } => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.channel.id == channel_id) {
                    detail.panel.finish(result);
                }
            }
        }
    }

    fn apply_page(&mut self, request: &PageRequest, result: changuide_core::Result<changuide_core::api::PageFragment>) {
        match self.pager.finish(request, result) {
            PageOutcome::Appended { added, .. } => {
                let items = self.pager.items();
                let new_ids: Vec<ChannelId> = items[items.len() - added..]
                    .iter()
                    .filter_map(|item| item.channel_id)
                    .collect();
                let ids = self.hover.prefetch(new_ids);
                if !ids.is_empty() {
                    self.issue(Command::Prefetch(ids));
                }
                if self.status_message.as_deref().is_some_and(|m| m.starts_with("Page failed")) {
                    self.clear_status();
                }
                self.check_scroll();
            }
            PageOutcome::Failed(kind) => {
                let reason = self.pager.last_error().unwrap_or("unknown error").to_string();
                self.set_status(format!("Page failed ({:?}): {} - press m to retry", kind, reason));
            }
            PageOutcome::Stale => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{channel, fragment, list_item};
    use changuide_core::Error;

    fn app() -> App {
        let mut config = AppConfig::default();
        config.api.base_url = "https://guide.example.com".to_string();
        let mut app = App::new(Arc::new(config), vec!["Comedy".into(), "News".into()]);
        app.screen_width = 80;
        app
    }

    fn page_request(app: &mut App) -> PageRequest {
        app.take_commands()
            .into_iter()
            .find_map(|c| match c {
                Command::FetchPage(request) => Some(request),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_start_requests_featured_and_first_page() {
        let mut app = app();
        app.start();
        let commands = app.take_commands();
        assert!(matches!(commands[0], Command::FetchFeatured(_)));
        assert_eq!(
            commands[1],
            Command::FetchPage(PageRequest { url: "/popular/".into() })
        );
        assert_eq!(app.indicator.active(), 2);
    }

    #[test]
    fn test_page_result_prefetches_hover_details() {
        let mut app = app();
        app.start();
        let request = page_request(&mut app);

        let items: Vec<_> = (1..=10).map(|i| list_item(i, "card")).collect();
        app.apply(FetchResult::Page {
            request,
            result: Ok(fragment(items, Some("/popular/?page=2"))),
        });

        let commands = app.take_commands();
        assert_eq!(commands[0], Command::Prefetch((1..=10).collect()));
        assert_eq!(app.pager.items().len(), 10);
    }

    #[test]
    fn test_failed_page_offers_retry() {
        let mut app = app();
        app.start();
        let request = page_request(&mut app);
        app.apply(FetchResult::Page {
            request,
            result: Err(Error::Timeout("/popular/".into())),
        });

        assert!(app.status_message.as_ref().unwrap().contains("press m"));
        assert!(app.pager.load_more_visible());
        app.load_more();
        assert_eq!(
            app.take_commands(),
            vec![Command::FetchPage(PageRequest { url: "/popular/".into() })]
        );
        assert!(matches!(
            app.pager.phase(),
            crate::pager::PagerPhase::Fetching { .. }
        ));
    }

    #[test]
    fn test_viewport_near_bottom_fetches_next_page() {
        let mut app = app();
        app.start();
        let request = page_request(&mut app);
        let items: Vec<_> = (1..=8).map(|i| list_item(i, "card")).collect();
        app.apply(FetchResult::Page {
            request,
            result: Ok(fragment(items, Some("/popular/?page=2"))),
        });
        app.take_commands();
        assert!(!app.pager.is_loading());

        // 25 rows of content leave 5 below a 20 row viewport
        app.set_list_viewport(Rect::new(0, 5, 80, 20), 80);
        assert_eq!(
            app.take_commands(),
            vec![Command::FetchPage(PageRequest { url: "/popular/?page=2".into() })]
        );

        // further layout passes while loading stay quiet
        app.set_list_viewport(Rect::new(0, 5, 80, 22), 80);
        app.scroll_by(3);
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_pointer_path_into_popover_keeps_it_open() {
        let mut app = app();
        app.hover.cache_mut().resolve(channel(7, "Rocketboom"));
        app.hit_map = vec![
            (Rect::new(0, 5, 40, 3), Region::Trigger(7)),
            (Rect::new(40, 5, 30, 10), Region::Popover(7)),
        ];

        app.pointer_moved(10, 6);
        assert!(app.hover.is_visible(7));
        assert!(app.popover_rating.is_some());

        for x in 11..60 {
            app.pointer_moved(x, 6);
            assert!(app.hover.is_visible(7), "flicker at x={}", x);
        }
        app.pointer_moved(10, 6);
        assert!(app.hover.is_visible(7));

        app.pointer_moved(75, 30);
        assert!(!app.hover.is_visible(7));
        assert!(app.popover_rating.is_none());
    }

    #[test]
    fn test_hover_miss_issues_single_fetch() {
        let mut app = app();
        app.hit_map = vec![(Rect::new(0, 5, 40, 3), Region::Trigger(9))];
        for _ in 0..5 {
            app.pointer_moved(1, 6);
            app.pointer_moved(60, 30);
        }
        let fetches = app
            .take_commands()
            .into_iter()
            .filter(|c| *c == Command::FetchDetail(9))
            .count();
        // leaving while pending drops the popover but the fetch stays claimed
        assert_eq!(fetches, 1);
    }

    #[test]
    fn test_rate_login_opens_browser() {
        let mut app = app();
        app.hover.cache_mut().resolve(channel(7, "a"));
        app.hit_map = vec![(Rect::new(0, 5, 40, 3), Region::Trigger(7))];
        app.pointer_moved(1, 6);

        app.rate(4);
        assert_eq!(
            app.take_commands(),
            vec![Command::Rate { channel_id: 7, star: 4 }]
        );
        app.apply(FetchResult::Rated {
            channel_id: 7,
            star: 4,
            result: Err(Error::LoginRequired("https://guide.example.com/channels/7/rate/?rating=4".into())),
        });
        assert_eq!(
            app.take_commands(),
            vec![Command::OpenUrl("https://guide.example.com/channels/7/rate/?rating=4".into())]
        );
    }

    #[test]
    fn test_subscribe_hits_then_opens() {
        let mut app = app();
        app.hover.cache_mut().resolve(channel(7, "a"));
        app.hit_map = vec![(Rect::new(0, 5, 40, 3), Region::Trigger(7))];
        app.pointer_moved(1, 6);

        app.subscribe();
        match &app.take_commands()[0] {
            Command::Subscribe { hit_url, subscribe_url } => {
                assert_eq!(hit_url, "https://guide.example.com/channels/subscribe-hit/7");
                assert!(subscribe_url.starts_with("http://subscribe.example.com/"));
            }
            other => panic!("unexpected {:?}", other),
        }

        app.apply(FetchResult::Subscribed {
            subscribe_url: "http://subscribe.example.com/?url=feed7".into(),
            result: Err(Error::Timeout("hit".into())),
        });
        assert_eq!(
            app.take_commands(),
            vec![Command::OpenUrl("http://subscribe.example.com/?url=feed7".into())]
        );
    }

    #[test]
    fn test_genre_selection_fetches_both_listings_and_details() {
        let mut app = app();
        app.select_genre();
        let commands = app.take_commands();
        assert_eq!(commands.len(), 2);
        let Command::FetchGenreListing { request, .. } = &commands[0] else {
            panic!("expected genre listing");
        };

        app.apply(FetchResult::GenreListing {
            generation: request.generation,
            listing: Listing::Popular,
            result: Ok(vec![channel(1, "a"), channel(2, "b")]),
        });
        assert_eq!(
            app.take_commands(),
            vec![
                Command::FetchGenreDetail { generation: request.generation, index: 0, id: 1 },
                Command::FetchGenreDetail { generation: request.generation, index: 1, id: 2 },
            ]
        );
    }

    #[test]
    fn test_featured_loads_carousel() {
        let mut app = app();
        app.apply(FetchResult::Featured(Ok((1..=6).map(|i| channel(i, "f")).collect())));
        assert_eq!(app.carousel.total_items(), 6);
        assert!(app.carousel.is_rotation_scheduled());
        assert_eq!(app.visible_featured().len(), 3);
    }

    #[test]
    fn test_open_detail_while_prefetch_in_flight() {
        let mut app = app();
        app.start();
        let request = page_request(&mut app);
        app.apply(FetchResult::Page {
            request,
            result: Ok(fragment(vec![list_item(7, "a")], None)),
        });
        assert!(app.take_commands().contains(&Command::Prefetch(vec![7])));

        app.open_detail();
        assert!(app.take_commands().is_empty());
        assert!(app.detail.is_none());

        app.apply(FetchResult::Prefetch { ids: vec![7], result: Ok(vec![channel(7, "a")]) });
        assert!(app.detail.is_some());
        assert_eq!(app.focus, Focus::Detail);
    }

    #[test]
    fn test_open_detail_falls_back_when_batch_omits_channel() {
        let mut app = app();
        app.start();
        let request = page_request(&mut app);
        app.apply(FetchResult::Page {
            request,
            result: Ok(fragment(vec![list_item(7, "a")], None)),
        });
        app.take_commands();

        app.open_detail();
        app.apply(FetchResult::Prefetch { ids: vec![7], result: Ok(Vec::new()) });
        assert_eq!(app.take_commands(), vec![Command::FetchDetail(7)]);
        assert!(app.detail.is_none());

        app.apply(FetchResult::Detail { id: 7, result: Ok(channel(7, "a")) });
        assert_eq!(app.focus, Focus::Detail);
        assert!(app.detail.is_some());
    }

    #[test]
    fn test_open_detail_and_queue() {
        let mut app = app();
        app.start();
        let request = page_request(&mut app);
        app.apply(FetchResult::Page {
            request,
            result: Ok(fragment(vec![list_item(7, "a")], None)),
        });
        app.take_commands();

        let mut detail = channel(7, "a");
        detail.item = vec![changuide_core::api::ChannelItem {
            id: Some(70),
            name: "ep".into(),
            ..Default::default()
        }];
        app.apply(FetchResult::Prefetch { ids: vec![7], result: Ok(vec![detail]) });

        app.open_detail();
        assert_eq!(app.focus, Focus::Detail);

        // not subscribed yet, so queueing is refused
        app.toggle_queue();
        assert!(app.take_commands().is_empty());

        app.toggle_subscription();
        assert_eq!(
            app.take_commands(),
            vec![Command::Subscription { channel_id: 7, subscribe: true }]
        );
        app.apply(FetchResult::SubscriptionChanged {
            channel_id: 7,
            result: Ok(changuide_core::api::SubscriptionStatus::Subscribed),
        });
        app.toggle_queue();
        assert_eq!(
            app.take_commands(),
            vec![Command::Queue { item_id: 70, queue: true }]
        );
    }

    #[test]
    fn test_indicator_tracks_outstanding_fetches() {
        let mut app = app();
        app.start();
        let request = page_request(&mut app);
        assert!(app.indicator.is_visible());
        app.apply(FetchResult::Featured(Ok(Vec::new())));
        app.apply(FetchResult::Page {
            request,
            result: Ok(fragment(Vec::new(), None)),
        });
        assert!(!app.indicator.is_visible());
    }
}
