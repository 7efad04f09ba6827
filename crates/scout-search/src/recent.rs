//! Recent-search history persisted in client-local storage.

use chrono::{DateTime, Utc};
use scout_cache::{Cache, CacheError};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Maximum number of entries kept.
pub const MAX_RECENT_SEARCHES: usize = 10;

/// Storage key of the persisted list.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// One committed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearchEntry {
    pub id: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

impl RecentSearchEntry {
    /// Text shown for the entry: the query, else the tag.
    pub fn label(&self) -> &str {
        if self.query.is_empty() {
            self.tag.as_deref().unwrap_or_default()
        } else {
            &self.query
        }
    }

    fn matches(&self, query: &str, tag: Option<&str>) -> bool {
        self.query.to_lowercase() == query.to_lowercase() && self.tag.as_deref() == tag
    }
}

/// Bounded, deduplicated, newest-first list of recent searches.
///
/// Every mutation writes the full list back to the store.
#[derive(Debug, Clone)]
pub struct RecentSearches {
    cache: Cache,
    key: String,
    capacity: usize,
    entries: Vec<RecentSearchEntry>,
}

impl RecentSearches {
    /// Load the list stored under the default key.
    pub fn load(cache: Cache) -> Self {
        Self::load_with(cache, RECENT_SEARCHES_KEY, MAX_RECENT_SEARCHES)
    }

    /// Load the list stored under `key`, keeping at most `capacity` entries.
    ///
    /// Never fails: unreadable data is logged and treated as empty.
    pub fn load_with(cache: Cache, key: impl Into<String>, capacity: usize) -> Self {
        let mut recent = Self {
            cache,
            key: key.into(),
            capacity,
            entries: Vec::new(),
        };
        recent.reload();
        recent
    }

    /// Re-read the persisted list.
    pub fn reload(&mut self) {
        self.entries = match self.cache.get::<Vec<RecentSearchEntry>>(&self.key) {
            Ok(Some(mut entries)) => {
                entries.truncate(self.capacity);
                entries
            }
            Ok(None) => Vec::new(),
            Err(CacheError::SerializeError(e)) => {
                tracing::warn!(key = %self.key, error = %e, "failed to parse recent searches");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read recent searches");
                Vec::new()
            }
        };
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[RecentSearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a committed search now.
    pub fn record(&mut self, query: &str, tag: Option<&str>) -> Result<bool, SearchError> {
        self.record_at(query, tag, Utc::now())
    }

    /// Record a committed search at `now`.
    ///
    /// Returns `false` without touching storage when both `query` and `tag`
    /// are empty.
    pub fn record_at(
        &mut self,
        query: &str,
        tag: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool, SearchError> {
        let query = query.trim();
        let tag = tag.filter(|t| !t.is_empty());
        if query.is_empty() && tag.is_none() {
            return Ok(false);
        }

        let timestamp = now.timestamp_millis();
        let id = self.next_id(timestamp);
        let entry = RecentSearchEntry {
            id: id.to_string(),
            query: query.to_string(),
            tag: tag.map(str::to_string),
            timestamp,
        };

        let mut updated = Vec::with_capacity(self.capacity);
        updated.push(entry);
        updated.extend(
            self.entries
                .iter()
                .filter(|e| !e.matches(query, tag))
                .cloned(),
        );
        updated.truncate(self.capacity);
        self.entries = updated;

        self.persist()?;
        tracing::debug!(query, tag, count = self.entries.len(), "recorded recent search");
        Ok(true)
    }

    /// Remove every entry and the persisted blob.
    pub fn clear(&mut self) -> Result<(), SearchError> {
        self.entries.clear();
        self.cache.delete(&self.key)?;
        Ok(())
    }

    /// Ids are creation timestamps, bumped past the newest existing id so
    /// two entries recorded in the same millisecond stay distinct.
    fn next_id(&self, timestamp: i64) -> i64 {
        let newest = self
            .entries
            .iter()
            .filter_map(|e| e.id.parse::<i64>().ok())
            .max();
        match newest {
            Some(newest) if newest >= timestamp => newest + 1,
            _ => timestamp,
        }
    }

    fn persist(&self) -> Result<(), SearchError> {
        self.cache.set(&self.key, &self.entries)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scout_cache::{KvStore, MemoryStore};
    use std::sync::Arc;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_record_dedups_to_head() {
        let mut recent = RecentSearches::load(Cache::new(store()));
        recent.record_at("mouse", None, at(1_000)).unwrap();
        recent.record_at("desk", None, at(2_000)).unwrap();
        recent.record_at("Mouse ", None, at(3_000)).unwrap();

        let queries: Vec<_> = recent.entries().iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["Mouse", "desk"]);
        assert_eq!(recent.entries()[0].timestamp, 3_000);
    }

    #[test]
    fn test_record_twice_keeps_one() {
        let mut recent = RecentSearches::load(Cache::new(store()));
        recent.record("mouse", None).unwrap();
        recent.record("mouse", None).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent.entries()[0].query, "mouse");
    }

    #[test]
    fn test_same_query_different_tag_is_distinct() {
        let mut recent = RecentSearches::load(Cache::new(store()));
        recent.record_at("", Some("gaming"), at(1)).unwrap();
        recent.record_at("", Some("Gaming"), at(2)).unwrap();
        recent.record_at("", Some("gaming"), at(3)).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent.entries()[0].label(), "gaming");
    }

    #[test]
    fn test_capacity() {
        let mut recent = RecentSearches::load(Cache::new(store()));
        for i in 0..25 {
            recent.record_at(&format!("q{i}"), None, at(i)).unwrap();
            assert!(recent.len() <= MAX_RECENT_SEARCHES);
        }
        assert_eq!(recent.len(), MAX_RECENT_SEARCHES);
        assert_eq!(recent.entries()[0].query, "q24");
    }

    #[test]
    fn test_empty_record_is_noop() {
        let store = store();
        let mut recent = RecentSearches::load(Cache::new(store.clone()));
        assert!(!recent.record("   ", None).unwrap());
        assert!(!recent.record("", Some("")).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut recent = RecentSearches::load(Cache::new(store()));
        recent.record_at("a", None, at(500)).unwrap();
        recent.record_at("b", None, at(500)).unwrap();
        assert_eq!(recent.entries()[0].id, "501");
        assert_eq!(recent.entries()[1].id, "500");
    }

    #[test]
    fn test_persisted_and_reloaded() {
        let store = store();
        let mut recent = RecentSearches::load(Cache::new(store.clone()));
        recent.record_at("mouse", Some("wireless"), at(7)).unwrap();

        let raw = store.get(RECENT_SEARCHES_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json[0]["query"], "mouse");
        assert_eq!(json[0]["tag"], "wireless");
        assert_eq!(json[0]["timestamp"], 7);

        let reloaded = RecentSearches::load(Cache::new(store));
        assert_eq!(reloaded.entries(), recent.entries());
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let store = store();
        store.set(RECENT_SEARCHES_KEY, b"{definitely not a list").unwrap();

        let mut recent = RecentSearches::load(Cache::new(store));
        assert!(recent.is_empty());
        recent.record("desk", None).unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_clear() {
        let store = store();
        let mut recent = RecentSearches::load(Cache::new(store.clone()));
        recent.record("desk", None).unwrap();
        recent.clear().unwrap();
        assert!(recent.is_empty());
        assert!(!store.exists(RECENT_SEARCHES_KEY).unwrap());
    }
}
