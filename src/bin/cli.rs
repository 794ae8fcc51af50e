//! magnet-feed CLI
//!
//! Runs one feed synchronization per invocation; schedule it with cron.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use magnet_feed::{
    error::Result,
    models::Config,
    pipeline,
    storage::{FeedFile, LocalStateStore, StateStore},
};

/// magnet-feed - Forum magnet links to RSS
#[derive(Parser, Debug)]
#[command(
    name = "magnet-feed",
    version,
    about = "Keeps an RSS feed of filtered magnet links in sync with a forum"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the site once and append new entries to the feed
    Run {
        /// Override the feed output path
        #[arg(long)]
        feed: Option<PathBuf>,

        /// Override the state file path
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show state and feed statistics
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return Err(e);
        }
    };

    match cli.command {
        Command::Run { feed, state } => {
            if let Some(path) = feed {
                config.output.feed_path = path;
            }
            if let Some(path) = state {
                config.output.state_path = path;
            }

            config.validate()?;
            let report = pipeline::run_feed_sync(&config).await?;

            for failure in &report.failures {
                log::warn!("[{}] {}: {}", failure.kind, failure.url, failure.message);
            }
            log::info!("Done | Added this run: {}", report.entries_added);
        }

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            let state = LocalStateStore::new(&config.output.state_path)
                .load()
                .await?;
            log::info!("State file: {}", config.output.state_path.display());
            log::info!("Magnets seen: {}", state.magnets.len());
            log::info!("Topics tracked: {}", state.topics.len());

            let feed_file = FeedFile::new(&config.output.feed_path);
            match feed_file.load().await? {
                Some(feed) => {
                    log::info!("Feed: {} ({} entries)", feed_file.path().display(), feed.len());
                    if let Some(date) = &feed.channel.last_build_date {
                        log::info!("Last built: {}", date);
                    }
                }
                None => log::info!("No feed written yet."),
            }
        }
    }

    Ok(())
}
