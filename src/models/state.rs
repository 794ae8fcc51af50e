//! Durable synchronization state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visit metadata for a topic page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub visits: u32,
}

/// Record of everything already emitted.
///
/// `magnets` only ever grows. `topics` is bounded by [`SyncState::prune_topics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default)]
    pub magnets: BTreeSet<String>,

    #[serde(default)]
    pub topics: BTreeMap<String, TopicRecord>,
}

impl SyncState {
    /// Whether a magnet has been emitted before.
    pub fn has_seen(&self, magnet: &str) -> bool {
        self.magnets.contains(magnet)
    }

    /// Mark a magnet as emitted. Returns `true` if it was new.
    pub fn mark_seen(&mut self, magnet: impl Into<String>) -> bool {
        self.magnets.insert(magnet.into())
    }

    /// Record a visit to a topic page.
    pub fn record_visit(&mut self, url: &str, now: DateTime<Utc>) {
        self.topics
            .entry(url.to_string())
            .and_modify(|record| {
                record.last_seen = now;
                record.visits = record.visits.saturating_add(1);
            })
            .or_insert(TopicRecord {
                first_seen: now,
                last_seen: now,
                visits: 1,
            });
    }

    /// Drop the least recently seen topic records beyond `max`.
    ///
    /// Returns the number of records removed.
    pub fn prune_topics(&mut self, max: usize) -> usize {
        if self.topics.len() <= max {
            return 0;
        }

        let mut by_age: Vec<(DateTime<Utc>, String)> = self
            .topics
            .iter()
            .map(|(url, record)| (record.last_seen, url.clone()))
            .collect();
        by_age.sort();

        let excess = self.topics.len() - max;
        for (_, url) in by_age.into_iter().take(excess) {
            self.topics.remove(&url);
        }
        excess
    }
}
