// src/models/mod.rs

//! Domain models for the feed synchronizer.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod feed;
mod item;
mod state;

// Re-export all public types
pub use config::{
    BuildDatePolicy, ChannelConfig, Config, CrawlerConfig, FilterConfig, OutputConfig,
    SiteConfig, SizeSource,
};
pub use feed::{ChannelInfo, FeedDocument, FeedEntry, rss_date};
pub use item::{ContentType, ExtractedItem, annotate_title};
pub use state::{SyncState, TopicRecord};
