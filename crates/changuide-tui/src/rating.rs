//! Five-star rating widget state

use changuide_core::api::{Channel, ChannelId};
use changuide_core::{Error, Result};
use tracing::{info, warn};

pub const MAX_STARS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingKind {
    /// The current user's own rating
    User,
    /// Average over all raters
    Average,
}

/// How one star is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarFill {
    Empty,
    /// Partially lit, in percent
    Partial(u8),
    Full,
    /// Lit because the cursor is over this star or a later one
    Hover,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RateOutcome {
    Saved(u8),
    /// The guide wants a login first; open this URL to finish rating
    LoginRequired(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarRating {
    pub channel_id: ChannelId,
    pub kind: RatingKind,
    pub value: f64,
    hover: Option<u8>,
}

impl StarRating {
    /// User score wins over the average when both are present
    pub fn from_channel(channel: &Channel) -> Self {
        let (kind, value) = match channel.score {
            Some(score) => (RatingKind::User, score),
            None => (RatingKind::Average, channel.average_rating.unwrap_or(0.0)),
        };
        Self {
            channel_id: channel.id,
            kind,
            value: value.clamp(0.0, f64::from(MAX_STARS)),
            hover: None,
        }
    }

    pub fn whole_stars(&self) -> u8 {
        self.value.floor() as u8
    }

    /// Fill percentage of the star after the whole ones
    pub fn partial_percent(&self) -> u8 {
        ((self.value - self.value.floor()) * 100.0).round() as u8
    }

    /// Light stars up to `star` (1-based) while the cursor is on it
    pub fn fill(&mut self, star: u8) {
        self.hover = Some(star.clamp(1, MAX_STARS));
    }

    pub fn drain(&mut self) {
        self.hover = None;
    }

    pub fn hovered(&self) -> Option<u8> {
        self.hover
    }

    pub fn stars(&self) -> [StarFill; MAX_STARS as usize] {
        let mut stars = [StarFill::Empty; MAX_STARS as usize];
        if let Some(hover) = self.hover {
            for star in stars.iter_mut().take(hover as usize) {
                *star = StarFill::Hover;
            }
            return stars;
        }

        let whole = self.whole_stars() as usize;
        for star in stars.iter_mut().take(whole) {
            *star = StarFill::Full;
        }
        let percent = self.partial_percent();
        if percent > 0 && whole < stars.len() {
            stars[whole] = StarFill::Partial(percent);
        }
        stars
    }

    /// Tooltip text for the widget
    pub fn title(&self) -> String {
        match self.kind {
            RatingKind::User => format!("User Rating: {}", self.value),
            RatingKind::Average => format!("Average Rating: {}", self.value),
        }
    }

    /// Record a click on `star`, returning the rating to send
    ///
    /// The widget shows the new user rating right away; a failed request
    /// leaves it in place.
    pub fn click(&mut self, star: u8) -> u8 {
        let star = star.min(MAX_STARS);
        self.kind = RatingKind::User;
        self.value = f64::from(star);
        self.hover = None;
        star
    }
}

/// Classify the server's answer to a rating request
pub fn rate_outcome(channel_id: ChannelId, star: u8, result: Result<()>) -> RateOutcome {
    match result {
        Ok(()) => {
            info!(channel = channel_id, star, "Channel rated");
            RateOutcome::Saved(star)
        }
        Err(Error::LoginRequired(url)) => RateOutcome::LoginRequired(url),
        Err(e) => {
            warn!(channel = channel_id, "Rating failed: {}", e);
            RateOutcome::Failed(e.to_string())
        }
    }
}

/// "Avg. of N Ratings: M Stars" with singular forms for one
pub fn rating_count_line(channel: &Channel) -> Option<String> {
    let count = channel.count_rating.filter(|c| *c > 0)?;
    let average = channel.average_rating.unwrap_or(0.0);
    let ratings = if count == 1 {
        "Avg. of 1 Rating:".to_string()
    } else {
        format!("Avg. of {} Ratings:", count)
    };
    let stars = if average == 1.0 {
        "1 Star".to_string()
    } else {
        format!("{} Stars", average)
    };
    Some(format!("{} {}", ratings, stars))
}
