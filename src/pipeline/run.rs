// src/pipeline/run.rs

//! Feed sync entry point wired to the real HTTP client and local files.

use chrono::Utc;

use crate::error::Result;
use crate::models::Config;
use crate::services::SizeLanguagePolicy;
use crate::storage::{FeedFile, LocalStateStore};
use crate::utils::http::HttpFetcher;

use super::sync::{SyncContext, SyncReport, run_sync};

/// Run one synchronization pass with the configured site and output files.
pub async fn run_feed_sync(config: &Config) -> Result<SyncReport> {
    let start_time = Utc::now();
    log::info!("Syncing feed from {}", config.site.base_url);

    let fetcher = HttpFetcher::from_config(&config.crawler)?;
    let filter = SizeLanguagePolicy::new(config.filter.clone());
    let ctx = SyncContext {
        config,
        fetcher: &fetcher,
        filter: &filter,
    };

    let store = LocalStateStore::new(&config.output.state_path);
    let feed_file = FeedFile::new(&config.output.feed_path);
    let report = run_sync(&ctx, &store, &feed_file).await?;

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Visited {}/{} topics, added {} entries ({} rejected, {} failed) in {}s",
        report.topics_visited,
        report.topics_found,
        report.entries_added,
        report.topics_rejected,
        report.failures.len(),
        elapsed.num_seconds()
    );
    if report.cap_reached {
        log::info!(
            "Emission cap of {} reached; remaining topics wait for the next run",
            config.crawler.max_new_entries
        );
    }
    if report.feed_written {
        log::info!("Feed written to {}", feed_file.path().display());
    } else {
        log::info!("No new entries; feed left untouched");
    }

    Ok(report)
}
