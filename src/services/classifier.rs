// src/services/classifier.rs

//! Title classification: size estimate, content type and language gate.
//!
//! The rules are plain functions so each can be tested on its own. The
//! [`ContentFilter`] trait bundles them into a policy the sync pipeline
//! consults, which lets a different rule set be swapped in without touching
//! the pipeline.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ContentType, FilterConfig};

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(gb|mb)").expect("size pattern is valid")
});

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Estimate a size in GB from the first `<number> GB|MB` in `text`.
pub fn estimate_size_gb(text: &str) -> Option<f64> {
    let caps = SIZE_PATTERN.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();

    if unit.eq_ignore_ascii_case("mb") {
        Some(value / 1024.0)
    } else {
        Some(value)
    }
}

/// Exact size in GB from a magnet's `xl` (exact length) parameter.
pub fn magnet_size_gb(magnet: &str) -> Option<f64> {
    let parsed = url::Url::parse(magnet).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "xl")
        .and_then(|(_, value)| value.parse::<u64>().ok())
        .map(|bytes| bytes as f64 / BYTES_PER_GB)
}

/// Series if the lowercased title contains any keyword, else movie.
pub fn classify_content_type<S: AsRef<str>>(title: &str, keywords: &[S]) -> ContentType {
    if contains_any(title, keywords) {
        ContentType::Series
    } else {
        ContentType::Movie
    }
}

/// True if the title carries a Telugu or an English marker.
pub fn is_allowed_language<S: AsRef<str>>(title: &str, telugu: &[S], english: &[S]) -> bool {
    contains_any(title, telugu) || contains_any(title, english)
}

/// Size rule: movies have a ceiling, series a floor, unknown size passes.
pub fn passes_size_rule(
    size_gb: Option<f64>,
    kind: ContentType,
    movie_max_gb: f64,
    series_min_gb: f64,
) -> bool {
    match (size_gb, kind) {
        (None, _) => true,
        (Some(size), ContentType::Movie) => size <= movie_max_gb,
        (Some(size), ContentType::Series) => size >= series_min_gb,
    }
}

fn contains_any<S: AsRef<str>>(title: &str, needles: &[S]) -> bool {
    let lower = title.to_lowercase();
    needles
        .iter()
        .any(|needle| lower.contains(&needle.as_ref().to_lowercase()))
}

/// A filter policy consulted per topic.
pub trait ContentFilter: Send + Sync {
    /// Hard gate applied before any size check.
    fn allows_language(&self, title: &str) -> bool;

    fn content_type(&self, title: &str) -> ContentType;

    fn allows_size(&self, size_gb: Option<f64>, kind: ContentType) -> bool;
}

/// The default policy: configurable language markers and movie/series size bounds.
#[derive(Debug, Clone)]
pub struct SizeLanguagePolicy {
    config: FilterConfig,
}

impl SizeLanguagePolicy {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }
}

impl Default for SizeLanguagePolicy {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl ContentFilter for SizeLanguagePolicy {
    fn allows_language(&self, title: &str) -> bool {
        is_allowed_language(
            title,
            &self.config.telugu_markers,
            &self.config.english_markers,
        )
    }

    fn content_type(&self, title: &str) -> ContentType {
        classify_content_type(title, &self.config.series_keywords)
    }

    fn allows_size(&self, size_gb: Option<f64>, kind: ContentType) -> bool {
        passes_size_rule(
            size_gb,
            kind,
            self.config.movie_max_gb,
            self.config.series_min_gb,
        )
    }
}
