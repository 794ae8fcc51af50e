// src/pipeline/sync.rs

//! Incremental feed synchronization.
//!
//! One run: load state and feed, enumerate topics from the landing page,
//! visit them one at a time, merge qualifying magnets into the feed, then
//! persist. Per-topic failures are recorded and skipped; landing page,
//! state and feed failures abort the run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    BuildDatePolicy, ChannelInfo, Config, ExtractedItem, FeedDocument, FeedEntry, SizeSource,
    SyncState, annotate_title,
};
use crate::services::classifier::{ContentFilter, magnet_size_gb};
use crate::services::{TitleCleaner, enumerate_topics, extract_topic};
use crate::storage::{FeedFile, StateStore};
use crate::utils::http::PageFetcher;

/// Everything a run needs, passed explicitly instead of living in globals.
pub struct SyncContext<'a> {
    pub config: &'a Config,
    pub fetcher: &'a dyn PageFetcher,
    pub filter: &'a dyn ContentFilter,
}

/// A topic that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicFailure {
    pub url: String,
    pub kind: &'static str,
    pub message: String,
}

/// Summary of a sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub topics_found: usize,
    pub topics_visited: usize,
    pub topics_rejected: usize,
    pub entries_added: usize,
    pub cap_reached: bool,
    pub feed_written: bool,
    pub failures: Vec<TopicFailure>,
}

/// Why a topic contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Language,
    Size,
}

/// Run one synchronization pass.
pub async fn run_sync(
    ctx: &SyncContext<'_>,
    store: &dyn StateStore,
    feed_file: &FeedFile,
) -> Result<SyncReport> {
    let config = ctx.config;
    let now = Utc::now();

    let mut state = store.load().await?;
    let mut feed = match feed_file.load().await? {
        Some(doc) => doc,
        None => {
            log::info!("No feed at {}, creating one", feed_file.path().display());
            FeedDocument::new(ChannelInfo::from(&config.channel))
        }
    };

    // A guid already in the feed must never be emitted again, even if the
    // state file was lost.
    let absorbed = feed
        .guids()
        .into_iter()
        .filter(|guid| state.mark_seen(*guid))
        .count();
    if absorbed > 0 {
        log::info!("Recovered {absorbed} magnets from existing feed entries");
    }

    let topics = discover_topics(ctx).await?;
    let cleaner = TitleCleaner::new(&config.site.title_remove_patterns)?;
    let delay = Duration::from_secs(config.crawler.request_delay_secs);
    let cap = config.crawler.max_new_entries;

    let mut report = SyncReport {
        topics_found: topics.len(),
        ..SyncReport::default()
    };

    for url in &topics {
        if report.entries_added >= cap {
            break;
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        report.topics_visited += 1;
        state.record_visit(url, now);

        let item = match fetch_topic(ctx, &cleaner, url).await {
            Ok(item) => item,
            Err(error) => {
                log::warn!("Skipping topic {url}: {error}");
                report.failures.push(TopicFailure {
                    url: url.clone(),
                    kind: error.kind(),
                    message: error.to_string(),
                });
                continue;
            }
        };

        match merge_topic(
            &item,
            ctx.filter,
            config.filter.size_source,
            &mut state,
            &mut feed,
            now,
            cap - report.entries_added,
        ) {
            Ok(added) => report.entries_added += added,
            Err(reason) => {
                log::debug!("Rejected topic {url} ({reason:?}): {}", item.title);
                report.topics_rejected += 1;
            }
        }
    }
    report.cap_reached = report.entries_added >= cap;

    // Feed before state: a magnet may only be marked seen once its entry is
    // on disk. A failed state save is repaired by guid absorption next run.
    let write_feed = report.entries_added > 0
        || config.output.build_date_policy == BuildDatePolicy::Always;
    if write_feed {
        feed.touch(now);
        feed_file.save(&feed).await?;
        report.feed_written = true;
    }

    let pruned = state.prune_topics(config.output.max_tracked_topics);
    if pruned > 0 {
        log::debug!("Pruned {pruned} stale topic records");
    }
    store.save(&state).await?;

    Ok(report)
}

/// Fetch the landing page and enumerate topic URLs. Any failure here is fatal.
async fn discover_topics(ctx: &SyncContext<'_>) -> Result<Vec<String>> {
    let site = &ctx.config.site;
    let base = Url::parse(&site.base_url)?;
    let landing = ctx.fetcher.fetch(&site.base_url).await?;

    let document = Html::parse_document(&landing);
    let topics = enumerate_topics(
        &document,
        &base,
        &site.topic_marker,
        ctx.config.crawler.max_topics,
    )?;

    if topics.is_empty() {
        log::warn!("No topic links found on {}", site.base_url);
    } else {
        log::info!("Found {} topics on {}", topics.len(), site.base_url);
    }
    Ok(topics)
}

async fn fetch_topic(
    ctx: &SyncContext<'_>,
    cleaner: &TitleCleaner,
    url: &str,
) -> Result<ExtractedItem> {
    let raw = ctx.fetcher.fetch(url).await?;
    if raw.trim().is_empty() {
        return Err(AppError::parse(url, "empty response body"));
    }
    extract_topic(url, &raw, cleaner, ctx.filter)
}

/// Merge one topic's magnets into the feed.
///
/// Returns the number of entries appended, at most `remaining`.
fn merge_topic(
    item: &ExtractedItem,
    filter: &dyn ContentFilter,
    size_source: SizeSource,
    state: &mut SyncState,
    feed: &mut FeedDocument,
    now: DateTime<Utc>,
    remaining: usize,
) -> std::result::Result<usize, Rejection> {
    if !filter.allows_language(&item.title) {
        return Err(Rejection::Language);
    }
    if size_source == SizeSource::Title && !filter.allows_size(item.size_gb, item.kind) {
        return Err(Rejection::Size);
    }

    let mut added = 0;
    for magnet in &item.magnets {
        if added >= remaining {
            break;
        }
        if state.has_seen(magnet) {
            continue;
        }

        let size_gb = match size_source {
            SizeSource::Title => item.size_gb,
            SizeSource::MagnetThenTitle => magnet_size_gb(magnet).or(item.size_gb),
        };
        if !filter.allows_size(size_gb, item.kind) {
            continue;
        }

        let title = annotate_title(&item.title, size_gb);
        log::info!("Added: {title}");
        feed.append(FeedEntry::for_magnet(title, magnet, now));
        state.mark_seen(magnet.as_str());
        added += 1;
    }

    Ok(added)
}
