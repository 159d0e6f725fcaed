use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Margin, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use changuide_core::{AppConfig, GuideApi, HttpGuideApi};
use changuide_tui::{
    app::{App, Command},
    event::{AppEvent, EventHandler, FetchResult},
    input::{apply_action, handle_key_event, handle_mouse_event},
    widgets::{
        CarouselWidget, ChannelListWidget, DetailWidget, GenreBrowserWidget, PopoverWidget,
        StatusBarWidget,
    },
};

/// Rows taken by the featured strip, borders included
const CAROUSEL_HEIGHT: u16 = 7;

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    let api: Arc<dyn GuideApi> = Arc::new(HttpGuideApi::new(&config)?);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Changuide"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.clone(), config.ui.genres.clone());
    let event_handler = EventHandler::new(config.ui.tick_rate_ms);

    info!(base_url = %config.api.base_url, "Starting browser");
    let result = main_loop(&mut terminal, &mut app, &event_handler, api).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn main_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
    api: Arc<dyn GuideApi>,
) -> Result<()> {
    // Completed fetches come back here from their spawned tasks
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchResult>();

    app.start();

    loop {
        // Process any completed fetches (non-blocking)
        while let Ok(result) = fetch_rx.try_recv() {
            app.apply(result);
        }

        for command in app.take_commands() {
            match command {
                Command::OpenUrl(url) => open_in_browser(app, &url),
                command => spawn_fetch(command, &api, &fetch_tx),
            }
        }

        // Draw UI
        let mut hit_map = Vec::new();
        let mut list_viewport = Rect::default();
        let mut screen_width = 0;
        let view: &App = app;
        terminal.draw(|frame| {
            let size = frame.area();
            screen_width = size.width;

            // Featured strip, content, status bar
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(CAROUSEL_HEIGHT),
                    Constraint::Min(1),
                    Constraint::Length(1),
                ])
                .split(size);

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(main_layout[1]);

            CarouselWidget::render(frame, main_layout[0], view);
            hit_map = ChannelListWidget::render(frame, columns[0], view);
            if view.detail.is_some() {
                DetailWidget::render(frame, columns[1], view);
            } else {
                GenreBrowserWidget::render(frame, columns[1], view);
            }
            StatusBarWidget::render(frame, main_layout[2], view);

            // Popover goes on top of everything else
            if let Some(popover) = PopoverWidget::render(frame, &hit_map, view) {
                hit_map.push(popover);
            }

            list_viewport = columns[0].inner(Margin {
                vertical: 1,
                horizontal: 1,
            });
        })?;

        app.hit_map = hit_map;
        app.set_list_viewport(list_viewport, screen_width);

        // Sleep no longer than the next carousel step or rotation
        let now = Instant::now();
        if let Some(event) = event_handler.next_within(app.poll_timeout(now))? {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, app);
                    apply_action(app, action);
                }
                AppEvent::Mouse(mouse) => {
                    let action = handle_mouse_event(mouse, app);
                    apply_action(app, action);
                }
                AppEvent::Resize(_, _) => {}
                AppEvent::Tick => {}
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn open_in_browser(app: &mut App, url: &str) {
    info!(url, "Opening in browser");
    if let Err(e) = open::that(url) {
        warn!("Failed to open {}: {}", url, e);
        app.set_status(format!("Could not open {}", url));
    }
}

/// Run one guide request in the background and report back over `tx`
fn spawn_fetch(
    command: Command,
    api: &Arc<dyn GuideApi>,
    tx: &mpsc::UnboundedSender<FetchResult>,
) {
    let api = Arc::clone(api);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = match command {
            Command::FetchFeatured(query) => FetchResult::Featured(api.fetch_channels(&query).await),
            Command::FetchPage(request) => {
                let result = api.fetch_page(&request.url).await;
                FetchResult::Page { request, result }
            }
            Command::FetchDetail(id) => FetchResult::Detail {
                id,
                result: api.fetch_detail(id).await,
            },
            Command::Prefetch(ids) => {
                let result = api.fetch_details(&ids).await;
                FetchResult::Prefetch { ids, result }
            }
            Command::FetchGenreListing { request, listing } => FetchResult::GenreListing {
                generation: request.generation,
                listing,
                result: api.fetch_channels(&request.query(listing)).await,
            },
            Command::FetchGenreDetail {
                generation,
                index,
                id,
            } => FetchResult::GenreDetail {
                generation,
                index,
                result: api.fetch_detail(id).await,
            },
            Command::Rate { channel_id, star } => FetchResult::Rated {
                channel_id,
                star,
                result: api.rate(channel_id, star).await,
            },
            Command::Subscribe {
                hit_url,
                subscribe_url,
            } => FetchResult::Subscribed {
                result: api.fetch_subscribe_redirect(&hit_url).await,
                subscribe_url,
            },
            Command::Queue { item_id, queue } => FetchResult::Queued {
                item_id,
                result: api.set_queued(item_id, queue).await,
            },
            Command::Subscription {
                channel_id,
                subscribe,
            } => FetchResult::SubscriptionChanged {
                channel_id,
                result: api.set_subscribed(channel_id, subscribe).await,
            },
            Command::OpenUrl(_) => return,
        };
        // Receiver only goes away on shutdown
        let _ = tx.send(result);
    });
}
