// src/services/extractor.rs

//! Topic page extraction.
//!
//! Pulls the display title and every magnet URI out of a topic page.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::ExtractedItem;
use crate::services::classifier::{ContentFilter, estimate_size_gb};
use crate::utils::{normalize_whitespace, parse_selector};

static MAGNET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"magnet:\?[^\s"'<>]+"#).expect("magnet pattern is valid")
});

/// Removes site branding from page titles.
#[derive(Debug, Clone, Default)]
pub struct TitleCleaner {
    patterns: Vec<Regex>,
}

impl TitleCleaner {
    /// Compile the configured removal patterns.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn clean(&self, raw: &str) -> String {
        let mut result = normalize_whitespace(raw);
        for pattern in &self.patterns {
            result = pattern.replace_all(&result, "").into_owned();
        }
        result.trim().to_string()
    }
}

/// Every distinct magnet URI in `raw`, in first-seen order.
///
/// Scans the raw text rather than anchors only, since some pages print
/// magnets outside of tags.
pub fn find_magnets(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    MAGNET_PATTERN
        .find_iter(raw)
        .map(|m| m.as_str().replace("&amp;", "&"))
        .filter(|magnet| seen.insert(magnet.clone()))
        .collect()
}

/// Extract the title and magnets from a topic page.
///
/// The first non-empty `<h1>` wins; the `<title>` element is the fallback.
pub fn extract_topic(
    url: &str,
    raw: &str,
    cleaner: &TitleCleaner,
    filter: &dyn ContentFilter,
) -> Result<ExtractedItem> {
    let document = Html::parse_document(raw);
    let title = page_title(&document, cleaner)?
        .ok_or_else(|| AppError::parse(url, "page has no title"))?;

    let size_gb = estimate_size_gb(&title);
    let kind = filter.content_type(&title);

    Ok(ExtractedItem {
        title,
        size_gb,
        kind,
        magnets: find_magnets(raw),
    })
}

fn page_title(document: &Html, cleaner: &TitleCleaner) -> Result<Option<String>> {
    for selector in ["h1", "title"] {
        let sel = parse_selector(selector)?;
        let found = document
            .select(&sel)
            .map(|el| cleaner.clean(&el.text().collect::<String>()))
            .find(|title| !title.is_empty());
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use crate::services::classifier::SizeLanguagePolicy;

    const MAGNET_A: &str = "magnet:?xt=urn:btih:aaaa&dn=Movie";
    const MAGNET_B: &str = "magnet:?xt=urn:btih:bbbb&dn=Movie";

    fn cleaner() -> TitleCleaner {
        TitleCleaner::new(&[r"(?i)^\s*1TamilMV(\.\w+)?\s*[-|:]\s*"]).unwrap()
    }

    fn extract(raw: &str) -> Result<ExtractedItem> {
        extract_topic(
            "https://forum.example/topic/1",
            raw,
            &cleaner(),
            &SizeLanguagePolicy::default(),
        )
    }

    #[test]
    fn test_title_strips_branding() {
        let raw = "<html><head><title>1TamilMV - Movie Name (2024) Telugu - 2.5GB</title></head>\
                   <body></body></html>";
        let item = extract(raw).unwrap();
        assert_eq!(item.title, "Movie Name (2024) Telugu - 2.5GB");
        assert_eq!(item.size_gb, Some(2.5));
        assert_eq!(item.kind, ContentType::Movie);
    }

    #[test]
    fn test_h1_preferred_over_title() {
        let raw = "<html><head><title>1TamilMV | forum</title></head>\
                   <body><h1>  Show S01\n Telugu - 8GB </h1></body></html>";
        let item = extract(raw).unwrap();
        assert_eq!(item.title, "Show S01 Telugu - 8GB");
        assert_eq!(item.kind, ContentType::Series);
    }

    #[test]
    fn test_missing_title_is_parse_error() {
        let err = extract("<html><body><p>nothing</p></body></html>").unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_magnets_from_anchors_and_text() {
        let raw = format!(
            r#"<html><head><title>Film</title></head><body>
            <a href="{}">dl</a>
            <p>plain {MAGNET_B}</p>
            <a href="{MAGNET_A}">again</a>
            </body></html>"#,
            MAGNET_A.replace('&', "&amp;")
        );

        let item = extract(&raw).unwrap();
        assert_eq!(item.magnets, vec![MAGNET_A.to_string(), MAGNET_B.to_string()]);
    }

    #[test]
    fn test_magnet_stops_at_quote_and_bracket() {
        let magnets = find_magnets(r#"x='magnet:?xt=urn:btih:cccc' <magnet:?xt=urn:btih:dddd>"#);
        assert_eq!(
            magnets,
            vec!["magnet:?xt=urn:btih:cccc", "magnet:?xt=urn:btih:dddd"]
        );
    }

    #[test]
    fn test_page_without_magnets() {
        let item = extract("<html><head><title>Film</title></head></html>").unwrap();
        assert!(item.magnets.is_empty());
    }
}
