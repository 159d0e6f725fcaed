use anyhow::{bail, Result};

use changuide_core::{AppConfig, HttpGuideApi};
use changuide_tui::genre::GenreBrowser;

use super::channel::star_text;

pub async fn run(config: &AppConfig, name: &str) -> Result<()> {
    let api = HttpGuideApi::new(config)?;
    let mut browser = GenreBrowser::new(config.ui.genres.clone());
    browser.load_with(&api, name).await;

    if browser.slots().iter().all(Option::is_none) {
        bail!("No channels found for genre '{}'", name);
    }

    println!("{}\n", name);
    for (i, slot) in browser.slots().iter().enumerate() {
        let heading = if i < 2 { "Popular" } else { "Newest" };
        let Some(slot) = slot else {
            println!("{:<8} -", heading);
            continue;
        };
        let hd = if slot.hi_def { " [HD]" } else { "" };
        println!("{:<8} {}{}", heading, slot.name, hd);
        println!("         {}", slot.url);
        if let Some(rating) = &slot.rating {
            println!("         {}  {}", star_text(rating), rating.title());
        }
        if let Some(subscribers) = slot.subscribers_line() {
            println!("         {}", subscribers);
        }
        if let Some(thumb) = &slot.thumbnail_url {
            println!("         {}", thumb);
        }
    }

    if let Some(href) = browser.view_all_href() {
        println!("\nView all: {}", api.resolve_url(&href)?);
    }
    Ok(())
}
