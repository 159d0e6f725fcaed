//! Genre browser: two most popular and two newest channels per genre

use changuide_core::api::{Channel, ChannelId, ChannelQuery, ChannelSort};
use changuide_core::{GuideApi, Result};
use tracing::{debug, warn};

use crate::rating::StarRating;

pub const SLOT_COUNT: usize = 4;
const PER_LISTING: usize = 2;

/// Which half of the slots a listing fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Popular,
    Newest,
}

impl Listing {
    pub fn sort(&self) -> ChannelSort {
        match self {
            Listing::Popular => ChannelSort::Popular,
            Listing::Newest => ChannelSort::Newest,
        }
    }

    fn first_slot(&self) -> usize {
        match self {
            Listing::Popular => 0,
            Listing::Newest => PER_LISTING,
        }
    }
}

/// Requests issued for one genre selection
#[derive(Debug, Clone, PartialEq)]
pub struct GenreRequest {
    pub generation: u64,
    pub genre: String,
}

impl GenreRequest {
    pub fn query(&self, listing: Listing) -> ChannelQuery {
        ChannelQuery::category(&self.genre, listing.sort(), PER_LISTING)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreSlot {
    pub channel_id: ChannelId,
    pub name: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub hi_def: bool,
    pub subscribers_today: Option<u64>,
    pub rating: Option<StarRating>,
}

impl GenreSlot {
    fn from_channel(channel: &Channel) -> Self {
        Self {
            channel_id: channel.id,
            name: channel.name.clone(),
            description: channel.description.clone(),
            url: format!("/feeds/{}", channel.id),
            thumbnail_url: channel.thumbnail_url.as_deref().map(small_thumbnail),
            hi_def: channel.hi_def,
            subscribers_today: None,
            rating: None,
        }
    }

    pub fn subscribers_line(&self) -> Option<String> {
        self.subscribers_today
            .map(|n| format!("{} Subscribed Today", n))
    }
}

/// Browser thumbnails use the small rendition of the full-size image
pub fn small_thumbnail(url: &str) -> String {
    url.replace("370x247", "98x68")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreOutcome {
    Updated,
    /// Response for a genre that is no longer selected
    Stale,
    Failed,
}

#[derive(Debug, Default)]
pub struct GenreBrowser {
    genres: Vec<String>,
    selected: Option<String>,
    generation: u64,
    slots: [Option<GenreSlot>; SLOT_COUNT],
}

impl GenreBrowser {
    pub fn new(genres: Vec<String>) -> Self {
        Self {
            genres,
            ..Default::default()
        }
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn slots(&self) -> &[Option<GenreSlot>; SLOT_COUNT] {
        &self.slots
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Link to the full listing of the selected genre
    pub fn view_all_href(&self) -> Option<String> {
        let genre = self.selected.as_deref()?;
        let encoded: String = url::form_urlencoded::byte_serialize(genre.as_bytes()).collect();
        Some(format!("/genres/{}", encoded))
    }

    /// Select a genre; earlier in-flight responses become stale
    ///
    /// Slots keep showing the previous genre until the new listings land.
    pub fn select(&mut self, genre: &str) -> GenreRequest {
        self.generation += 1;
        self.selected = Some(genre.to_string());
        if !self.genres.iter().any(|g| g == genre) {
            self.genres.push(genre.to_string());
        }
        debug!(genre, generation = self.generation, "Genre selected");
        GenreRequest {
            generation: self.generation,
            genre: genre.to_string(),
        }
    }

    /// Fill one half of the slots, returning the ids that need a detail fetch
    pub fn apply_listing(
        &mut self,
        generation: u64,
        listing: Listing,
        result: Result<Vec<Channel>>,
    ) -> (GenreOutcome, Vec<(usize, ChannelId)>) {
        if generation != self.generation {
            return (GenreOutcome::Stale, Vec::new());
        }
        let channels = match result {
            Ok(channels) => channels,
            Err(e) => {
                warn!(?listing, "Genre listing failed: {}", e);
                return (GenreOutcome::Failed, Vec::new());
            }
        };

        let first = listing.first_slot();
        let mut wanted = Vec::new();
        for offset in 0..PER_LISTING {
            let index = first + offset;
            self.slots[index] = channels.get(offset).map(GenreSlot::from_channel);
            if let Some(slot) = &self.slots[index] {
                wanted.push((index, slot.channel_id));
            }
        }
        (GenreOutcome::Updated, wanted)
    }

    /// Add subscriber count and rating to a filled slot
    pub fn apply_detail(&mut self, generation: u64, index: usize, result: Result<Channel>) -> GenreOutcome {
        if generation != self.generation {
            return GenreOutcome::Stale;
        }
        let channel = match result {
            Ok(channel) => channel,
            Err(e) => {
                warn!(index, "Genre slot detail failed: {}", e);
                return GenreOutcome::Failed;
            }
        };
        match self.slots.get_mut(index).and_then(Option::as_mut) {
            Some(slot) if slot.channel_id == channel.id => {
                slot.subscribers_today = channel.subscription_count_today;
                slot.rating = Some(StarRating::from_channel(&channel));
                GenreOutcome::Updated
            }
            _ => GenreOutcome::Stale,
        }
    }

    /// Select `genre` and load all four slots inline
    pub async fn load_with(&mut self, api: &dyn GuideApi, genre: &str) {
        let request = self.select(genre);
        let popular_query = request.query(Listing::Popular);
        let newest_query = request.query(Listing::Newest);
        let (popular, newest) = tokio::join!(
            api.fetch_channels(&popular_query),
            api.fetch_channels(&newest_query),
        );

        let mut wanted = self.apply_listing(request.generation, Listing::Popular, popular).1;
        wanted.extend(self.apply_listing(request.generation, Listing::Newest, newest).1);

        for (index, id) in wanted {
            let detail = api.fetch_detail(id).await;
            self.apply_detail(request.generation, index, detail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{channel, MockApi};
    use changuide_core::Error;

    fn with_thumb(id: ChannelId, name: &str) -> Channel {
        let mut c = channel(id, name);
        c.thumbnail_url = Some(format!("http://s3.example.com/media/thumbnails/370x247/{}.jpg", id));
        c
    }

    #[test]
    fn test_small_thumbnail() {
        assert_eq!(
            small_thumbnail("http://x/media/thumbnails/370x247/1.jpg"),
            "http://x/media/thumbnails/98x68/1.jpg"
        );
    }

    #[test]
    fn test_query_per_listing() {
        let mut browser = GenreBrowser::new(vec!["Comedy".into()]);
        let request = browser.select("Comedy");
        let query = request.query(Listing::Newest);
        assert_eq!(query.sort, ChannelSort::Newest);
        assert_eq!(query.limit, 2);
        assert_eq!(query.filter, "category");
        assert_eq!(query.value, "Comedy");
    }

    #[test]
    fn test_listings_fill_their_halves() {
        let mut browser = GenreBrowser::default();
        let request = browser.select("Comedy");

        let (outcome, wanted) = browser.apply_listing(
            request.generation,
            Listing::Newest,
            Ok(vec![with_thumb(3, "c"), with_thumb(4, "d")]),
        );
        assert_eq!(outcome, GenreOutcome::Updated);
        assert_eq!(wanted, vec![(2, 3), (3, 4)]);
        assert!(browser.slots()[0].is_none());

        let slot = browser.slots()[2].as_ref().unwrap();
        assert_eq!(slot.url, "/feeds/3");
        assert!(slot.thumbnail_url.as_ref().unwrap().contains("98x68"));
    }

    #[test]
    fn test_short_listing_clears_slot() {
        let mut browser = GenreBrowser::default();
        let request = browser.select("News");
        browser.apply_listing(request.generation, Listing::Popular, Ok(vec![channel(1, "a"), channel(2, "b")]));
        browser.apply_listing(request.generation, Listing::Popular, Ok(vec![channel(5, "e")]));
        assert!(browser.slots()[1].is_none());
    }

    #[test]
    fn test_previous_genre_is_stale() {
        let mut browser = GenreBrowser::default();
        let comedy = browser.select("Comedy");
        let news = browser.select("News");

        let (outcome, _) = browser.apply_listing(comedy.generation, Listing::Popular, Ok(vec![channel(1, "joke")]));
        assert_eq!(outcome, GenreOutcome::Stale);
        assert!(browser.slots()[0].is_none());

        browser.apply_listing(news.generation, Listing::Popular, Ok(vec![channel(2, "report")]));
        assert_eq!(browser.apply_detail(comedy.generation, 0, Ok(channel(2, "report"))), GenreOutcome::Stale);
    }

    #[test]
    fn test_detail_adds_subscribers_and_rating() {
        let mut browser = GenreBrowser::default();
        let request = browser.select("Food");
        browser.apply_listing(request.generation, Listing::Popular, Ok(vec![channel(8, "chef")]));

        let mut detail = channel(8, "chef");
        detail.subscription_count_today = Some(17);
        detail.average_rating = Some(4.0);
        assert_eq!(browser.apply_detail(request.generation, 0, Ok(detail)), GenreOutcome::Updated);

        let slot = browser.slots()[0].as_ref().unwrap();
        assert_eq!(slot.subscribers_line().unwrap(), "17 Subscribed Today");
        assert_eq!(slot.rating.as_ref().unwrap().whole_stars(), 4);
    }

    #[test]
    fn test_view_all_href() {
        let mut browser = GenreBrowser::default();
        assert!(browser.view_all_href().is_none());
        browser.select("Arts & Culture");
        assert_eq!(browser.view_all_href().unwrap(), "/genres/Arts+%26+Culture");
    }

    #[test]
    fn test_failed_listing_keeps_slots() {
        let mut browser = GenreBrowser::default();
        let request = browser.select("Music");
        let (outcome, wanted) =
            browser.apply_listing(request.generation, Listing::Popular, Err(Error::Timeout("x".into())));
        assert_eq!(outcome, GenreOutcome::Failed);
        assert!(wanted.is_empty());
    }

    #[tokio::test]
    async fn test_load_with_fills_all_slots() {
        let mut detail = channel(1, "p1");
        detail.subscription_count_today = Some(3);
        let api = MockApi::with_channels([detail, channel(2, "p2"), channel(3, "n1"), channel(4, "n2")]);
        api.push_listing(Ok(vec![channel(1, "p1"), channel(2, "p2")]));
        api.push_listing(Ok(vec![channel(3, "n1"), channel(4, "n2")]));

        let mut browser = GenreBrowser::default();
        browser.load_with(&api, "Comedy").await;

        let names: Vec<&str> = browser
            .slots()
            .iter()
            .map(|s| s.as_ref().unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["p1", "p2", "n1", "n2"]);
        assert_eq!(browser.slots()[0].as_ref().unwrap().subscribers_today, Some(3));
        assert_eq!(api.detail_calls(), 4);
    }
}
