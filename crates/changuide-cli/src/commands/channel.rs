use anyhow::Result;

use changuide_core::{AppConfig, ChannelId, GuideApi, HttpGuideApi};
use changuide_tui::hover::{PopoverAction, PopoverView};
use changuide_tui::rating::{StarFill, StarRating};

pub async fn run(config: &AppConfig, id: ChannelId) -> Result<()> {
    let api = HttpGuideApi::new(config)?;
    let channel = api.fetch_detail(id).await?;
    let view = PopoverView::from_channel(&channel, &config.hover);

    println!("{} ({})", view.title, channel.id);
    println!("  {}  {}", star_text(&view.rating), view.rating.title());
    if let Some(count) = &view.count_line {
        println!("  {}", count);
    }
    println!();
    println!("{}", view.description);
    println!();
    for line in [view.genres_line(), view.tags_line()].into_iter().flatten() {
        println!("{}", line);
    }

    for action in &view.actions {
        let url = match action {
            PopoverAction::Subscribe { subscribe_url, .. } => subscribe_url.as_str(),
            PopoverAction::Watch(url) | PopoverAction::Listen(url) | PopoverAction::MoreDetails(url) => {
                url.as_str()
            }
        };
        println!("  {:<14} {}", action.label(), url);
    }

    if !channel.item.is_empty() {
        println!("\nItems ({}):", channel.item.len());
        for item in &channel.item {
            let date = item
                .published()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "----------".to_string());
            println!("  {}  {}", date, item.name);
        }
    }

    Ok(())
}

/// Plain-text stars, rounding the partial star to the nearest half
pub fn star_text(rating: &StarRating) -> String {
    let mut text = String::new();
    for star in rating.stars() {
        text.push(match star {
            StarFill::Full | StarFill::Hover => '★',
            StarFill::Partial(p) if p >= 50 => '⯪',
            _ => '☆',
        });
    }
    text
}
