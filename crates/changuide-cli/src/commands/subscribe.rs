use anyhow::Result;
use tracing::warn;

use changuide_core::{AppConfig, ChannelId, GuideApi, HttpGuideApi};

pub async fn run(config: &AppConfig, id: ChannelId) -> Result<()> {
    let api = HttpGuideApi::new(config)?;
    let channel = api.fetch_detail(id).await?;
    println!("Subscribing to: {}", channel.name);

    // The click is counted best effort; the subscribe URL opens either way
    if let Err(e) = api.fetch_subscribe_redirect(&channel.subscribe_hit_url).await {
        warn!("Subscribe hit failed: {}", e);
    }

    let url = api.resolve_url(&channel.subscribe_url)?;
    println!("Opening {}", url);
    open::that(url.as_str())?;
    Ok(())
}
