//! Feed document model.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use crate::models::ChannelConfig;

/// Format a timestamp the way RSS readers expect (`Tue, 01 Oct 2024 10:00:00 GMT`).
pub fn rss_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// A single feed item. `link` and `guid` both carry the magnet URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub pub_date: String,
}

impl FeedEntry {
    /// Build an entry for a magnet published at `at`.
    pub fn for_magnet(title: impl Into<String>, magnet: &str, at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            link: magnet.to_string(),
            guid: magnet.to_string(),
            pub_date: rss_date(at),
        }
    }
}

/// Channel-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub title: String,
    pub link: String,
    pub description: String,
    pub last_build_date: Option<String>,
}

impl From<&ChannelConfig> for ChannelInfo {
    fn from(config: &ChannelConfig) -> Self {
        Self {
            title: config.title.clone(),
            link: config.link.clone(),
            description: config.description.clone(),
            last_build_date: None,
        }
    }
}

/// An RSS document whose entries can only be appended to.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDocument {
    pub channel: ChannelInfo,
    entries: Vec<FeedEntry>,
}

impl FeedDocument {
    /// Create an empty document.
    pub fn new(channel: ChannelInfo) -> Self {
        Self {
            channel,
            entries: Vec::new(),
        }
    }

    /// Rebuild a document read from disk, keeping entries in file order.
    pub fn from_parts(channel: ChannelInfo, entries: Vec<FeedEntry>) -> Self {
        Self { channel, entries }
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry after all existing ones.
    pub fn append(&mut self, entry: FeedEntry) {
        self.entries.push(entry);
    }

    /// Set `lastBuildDate`.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.channel.last_build_date = Some(rss_date(at));
    }

    /// All guids currently in the document.
    pub fn guids(&self) -> HashSet<&str> {
        self.entries.iter().map(|e| e.guid.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_rss_date_format() {
        let at = Utc.with_ymd_and_hms(2024, 10, 1, 9, 5, 3).unwrap();
        assert_eq!(rss_date(at), "Tue, 01 Oct 2024 09:05:03 GMT");
    }

    #[test]
    fn test_append_preserves_order() {
        let at = Utc::now();
        let mut doc = FeedDocument::from_parts(
            ChannelInfo::default(),
            vec![FeedEntry::for_magnet("old", "magnet:?xt=1", at)],
        );
        doc.append(FeedEntry::for_magnet("new", "magnet:?xt=2", at));

        let titles: Vec<_> = doc.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["old", "new"]);
        assert!(doc.guids().contains("magnet:?xt=1"));
    }

    #[test]
    fn test_entry_link_and_guid_are_magnet() {
        let entry = FeedEntry::for_magnet("Title", "magnet:?xt=urn:btih:abc", Utc::now());
        assert_eq!(entry.link, entry.guid);
        assert_eq!(entry.guid, "magnet:?xt=urn:btih:abc");
    }
}
