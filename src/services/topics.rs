// src/services/topics.rs

//! Topic discovery from the landing page.

use std::collections::HashSet;

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::utils::{parse_selector, resolve_url};

/// Collect topic URLs from the landing page.
///
/// Links whose href contains `marker` are resolved against `base`,
/// deduplicated in first-seen order and truncated to `limit`.
pub fn enumerate_topics(
    document: &Html,
    base: &Url,
    marker: &str,
    limit: usize,
) -> Result<Vec<String>> {
    let link_sel = parse_selector("a[href]")?;
    let mut seen = HashSet::new();
    let mut topics = Vec::new();

    for href in document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
    {
        if topics.len() >= limit {
            break;
        }
        if !href.contains(marker) {
            continue;
        }

        let Some(url) = resolve_url(base, href) else {
            log::debug!("Skipping unresolvable topic link: {href}");
            continue;
        };
        if seen.insert(url.clone()) {
            topics.push(url);
        }
    }

    Ok(topics)
}
