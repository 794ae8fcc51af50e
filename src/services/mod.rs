//! Service layer for the feed synchronizer.
//!
//! This module contains the business logic for:
//! - Title classification (`ContentFilter`, `SizeLanguagePolicy`)
//! - Topic discovery (`enumerate_topics`)
//! - Topic page extraction (`extract_topic`)

pub mod classifier;
mod extractor;
mod topics;

pub use classifier::{ContentFilter, SizeLanguagePolicy};
pub use extractor::{TitleCleaner, extract_topic, find_magnets};
pub use topics::enumerate_topics;
