//! Infinite-scroll pager for channel listings
//!
//! Watches how close the viewport is to the bottom of the list and pulls in
//! the next listing page when it gets near. At most one page fetch is in
//! flight at any time.

use changuide_core::api::{ListItem, PageFragment, Paginator};
use changuide_core::{FailureKind, PagerConfig, Result};
use tracing::{debug, info, warn};

/// Vertical scroll geometry of the listing, in rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub content_height: u32,
    pub scroll_top: u32,
    pub viewport_height: u32,
}

impl ScrollMetrics {
    pub fn distance_to_bottom(&self) -> u32 {
        self.content_height
            .saturating_sub(self.scroll_top.saturating_add(self.viewport_height))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerPhase {
    Idle,
    Fetching { url: String },
}

/// Ticket for one page fetch, handed back to `finish`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
}

/// What happened to a completed page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Appended { added: usize, has_more: bool },
    Failed(FailureKind),
    /// The listing moved on while the fetch was running
    Stale,
}

pub struct DebouncedPager {
    config: PagerConfig,
    phase: PagerPhase,
    next_page_url: Option<String>,
    items: Vec<ListItem>,
    paginator: Option<Paginator>,
    last_error: Option<String>,
}

impl DebouncedPager {
    /// Empty listing whose first page is `start_url`
    pub fn new(config: PagerConfig, start_url: Option<String>) -> Self {
        Self {
            config,
            phase: PagerPhase::Idle,
            next_page_url: start_url,
            items: Vec::new(),
            paginator: None,
            last_error: None,
        }
    }

    /// Listing seeded with an already loaded page
    pub fn from_fragment(config: PagerConfig, fragment: PageFragment) -> Self {
        Self {
            config,
            phase: PagerPhase::Idle,
            next_page_url: fragment.next_page_url,
            items: fragment.items,
            paginator: fragment.paginator,
            last_error: None,
        }
    }

    /// Drop the current listing and start over from `start_url`
    ///
    /// A fetch still in flight for the old listing will come back `Stale`.
    pub fn reset(&mut self, start_url: Option<String>) {
        self.phase = PagerPhase::Idle;
        self.next_page_url = start_url;
        self.items.clear();
        self.paginator = None;
        self.last_error = None;
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn paginator(&self) -> Option<&Paginator> {
        self.paginator.as_ref()
    }

    pub fn next_page_url(&self) -> Option<&str> {
        self.next_page_url.as_deref()
    }

    pub fn phase(&self) -> &PagerPhase {
        &self.phase
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, PagerPhase::Fetching { .. })
    }

    /// Message from the last failed fetch, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the manual "load more" control should be offered
    pub fn load_more_visible(&self) -> bool {
        !self.is_loading() && self.next_page_url.is_some()
    }

    /// Rows from the bottom at which the next page is requested
    pub fn threshold(&self) -> u32 {
        self.config.paginator_height + self.config.item_height * self.config.prefetch_items
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    /// React to a scroll or resize
    ///
    /// Returns a request when the viewport is close enough to the bottom,
    /// nothing is in flight and another page exists.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<PageRequest> {
        self.next_page_url.as_ref()?;
        if self.is_loading() {
            return None;
        }
        if metrics.distance_to_bottom() >= self.threshold() {
            return None;
        }
        self.load_next_page()
    }

    /// Start fetching the next page unless one is already in flight
    pub fn load_next_page(&mut self) -> Option<PageRequest> {
        if self.is_loading() {
            return None;
        }
        let url = self.next_page_url.clone()?;

        debug!(url = %url, "Loading next listing page");
        self.phase = PagerPhase::Fetching { url: url.clone() };
        Some(PageRequest { url })
    }

    /// Apply the result of a page fetch
    ///
    /// Both success and failure return the pager to `Idle`, so a failed
    /// page can be retried through `load_next_page`.
    pub fn finish(&mut self, request: &PageRequest, result: Result<PageFragment>) -> PageOutcome {
        match &self.phase {
            PagerPhase::Fetching { url } if *url == request.url => {}
            _ => {
                debug!(url = %request.url, "Discarding stale listing page");
                return PageOutcome::Stale;
            }
        }
        self.phase = PagerPhase::Idle;

        match result {
            Ok(fragment) => {
                let added = fragment.items.len();
                self.items.extend(fragment.items);
                self.paginator = fragment.paginator;
                self.next_page_url = fragment.next_page_url;
                self.last_error = None;

                info!(
                    added,
                    total = self.items.len(),
                    has_more = self.next_page_url.is_some(),
                    "Listing page appended"
                );
                PageOutcome::Appended {
                    added,
                    has_more: self.next_page_url.is_some(),
                }
            }
            Err(e) => {
                warn!(url = %request.url, "Listing page failed: {}", e);
                self.last_error = Some(e.to_string());
                PageOutcome::Failed(e.kind())
            }
        }
    }

    /// Page number of the anchor at or before `index`
    pub fn page_for_index(&self, index: usize) -> Option<u32> {
        let end = index.saturating_add(1).min(self.items.len());
        self.items[..end].iter().rev().find_map(|item| item.anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fragment, list_item};
    use changuide_core::Error;

    fn pager(start: &str) -> DebouncedPager {
        DebouncedPager::new(PagerConfig::default(), Some(start.to_string()))
    }

    fn near_bottom() -> ScrollMetrics {
        ScrollMetrics {
            content_height: 100,
            scroll_top: 80,
            viewport_height: 18,
        }
    }

    fn far_from_bottom() -> ScrollMetrics {
        ScrollMetrics {
            content_height: 500,
            scroll_top: 0,
            viewport_height: 40,
        }
    }

    #[test]
    fn test_threshold() {
        // one paginator row plus five items of three rows
        assert_eq!(pager("/p").threshold(), 16);
    }

    #[test]
    fn test_scroll_far_from_bottom_does_nothing() {
        let mut pager = pager("/page2");
        assert!(pager.on_scroll(far_from_bottom()).is_none());
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_single_flight_while_loading() {
        let mut pager = pager("/page2");
        let mut requests = 0;
        for _ in 0..50 {
            if pager.on_scroll(near_bottom()).is_some() {
                requests += 1;
            }
        }
        assert_eq!(requests, 1);
        assert!(pager.is_loading());
        assert!(pager.load_next_page().is_none());
        assert!(!pager.load_more_visible());
    }

    #[test]
    fn test_success_appends_in_order() {
        let mut pager = DebouncedPager::from_fragment(
            PagerConfig::default(),
            fragment(vec![list_item(1, "a"), list_item(2, "b")], Some("/page2")),
        );
        let request = pager.on_scroll(near_bottom()).unwrap();
        assert_eq!(request.url, "/page2");

        let outcome = pager.finish(
            &request,
            Ok(fragment(
                vec![list_item(3, "c"), list_item(4, "d"), list_item(5, "e")],
                Some("/page3"),
            )),
        );

        assert_eq!(outcome, PageOutcome::Appended { added: 3, has_more: true });
        let titles: Vec<&str> = pager.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(pager.next_page_url(), Some("/page3"));
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_last_page_stops_fetching() {
        let mut pager = pager("/page2");
        let request = pager.on_scroll(near_bottom()).unwrap();
        pager.finish(&request, Ok(fragment(vec![list_item(1, "a")], None)));

        assert!(pager.next_page_url().is_none());
        for _ in 0..10 {
            assert!(pager.on_scroll(near_bottom()).is_none());
        }
        assert!(pager.load_next_page().is_none());
        assert!(!pager.load_more_visible());
    }

    #[test]
    fn test_failure_clears_loading_and_allows_retry() {
        let mut pager = pager("/page2");
        let request = pager.on_scroll(near_bottom()).unwrap();
        let outcome = pager.finish(
            &request,
            Err(Error::Status { status: 500, url: "/page2".to_string() }),
        );

        assert_eq!(outcome, PageOutcome::Failed(FailureKind::Network));
        assert!(!pager.is_loading());
        assert!(pager.load_more_visible());
        assert!(pager.last_error().is_some());
        assert!(pager.items().is_empty());

        let retry = pager.load_next_page().unwrap();
        assert_eq!(retry.url, "/page2");
        pager.finish(&retry, Ok(fragment(vec![list_item(1, "a")], None)));
        assert_eq!(pager.items().len(), 1);
        assert!(pager.last_error().is_none());
    }

    #[test]
    fn test_malformed_page_is_reported() {
        let mut pager = pager("/page2");
        let request = pager.load_next_page().unwrap();
        let outcome = pager.finish(&request, Err(Error::Malformed("no list".to_string())));
        assert_eq!(outcome, PageOutcome::Failed(FailureKind::Malformed));
    }

    #[test]
    fn test_response_after_reset_is_stale() {
        let mut pager = pager("/genres/Comedy");
        let old = pager.load_next_page().unwrap();

        pager.reset(Some("/genres/News".to_string()));
        let outcome = pager.finish(&old, Ok(fragment(vec![list_item(1, "joke")], None)));

        assert_eq!(outcome, PageOutcome::Stale);
        assert!(pager.items().is_empty());
        assert_eq!(pager.next_page_url(), Some("/genres/News"));
    }

    #[test]
    fn test_page_for_index() {
        let mut first = list_item(1, "a");
        first.anchor = Some(1);
        let mut third = list_item(3, "c");
        third.anchor = Some(2);
        let pager = DebouncedPager::from_fragment(
            PagerConfig::default(),
            fragment(vec![first, list_item(2, "b"), third, list_item(4, "d")], None),
        );
        assert_eq!(pager.page_for_index(0), Some(1));
        assert_eq!(pager.page_for_index(1), Some(1));
        assert_eq!(pager.page_for_index(3), Some(2));
        assert_eq!(pager.page_for_index(99), Some(2));
    }
}
