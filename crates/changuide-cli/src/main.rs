use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use changuide_core::{AppConfig, ChannelId};

mod commands;

#[derive(Parser)]
#[command(name = "changuide")]
#[command(author, version, about = "A terminal browser for a media channel directory")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive browser
    Run,
    /// Print a channel's detail card
    Channel {
        /// Channel id
        id: ChannelId,
    },
    /// Print the most popular and newest channels of a genre
    Genre {
        /// Genre name, e.g. "Arts & Culture"
        name: String,
    },
    /// Register a subscription click and open the subscribe URL
    Subscribe {
        /// Channel id
        id: ChannelId,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    let interactive = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, interactive)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Channel { id }) => commands::channel::run(&config, id).await,
        Some(Commands::Genre { name }) => commands::genre::run(&config, &name).await,
        Some(Commands::Subscribe { id }) => commands::subscribe::run(&config, id).await,
        Some(Commands::Config) => commands::config::run(&config),
    }
}

/// Log to a file while the terminal UI owns the screen, stderr otherwise
fn init_logging(config: &AppConfig, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if interactive {
        std::fs::create_dir_all(config.data_dir())?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_path())?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}
