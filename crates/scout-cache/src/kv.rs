//! Typed wrapper with automatic JSON serialization.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::{CacheError, KvStore};

/// Type-safe cache over any [`KvStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap and clones share the
/// same backing store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KvStore>,
}

impl Cache {
    /// Wrap a store.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist. A stored blob that does not
    /// deserialize as `T` yields [`CacheError::SerializeError`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let recent: Option<Vec<RecentSearchEntry>> = cache.get("recentSearches")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Entry {
        query: String,
        timestamp: i64,
    }

    fn cache() -> Cache {
        Cache::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_typed_set_get() {
        let cache = cache();
        let entry = Entry {
            query: "mouse".to_string(),
            timestamp: 42,
        };
        cache.set("entry", &entry).unwrap();
        assert_eq!(cache.get::<Entry>("entry").unwrap(), Some(entry));
    }

    #[test]
    fn test_get_missing_is_none() {
        assert_eq!(cache().get::<Entry>("nope").unwrap(), None);
    }

    #[test]
    fn test_get_malformed_blob_is_serialize_error() {
        let store = Arc::new(MemoryStore::new());
        store.set("entry", b"{not json").unwrap();

        let cache = Cache::new(store);
        let result = cache.get::<Entry>("entry");
        assert!(matches!(result, Err(CacheError::SerializeError(_))));
    }

    #[test]
    fn test_clones_share_store() {
        let a = cache();
        let b = a.clone();
        a.set("n", &7u32).unwrap();
        assert_eq!(b.get::<u32>("n").unwrap(), Some(7));

        b.delete("n").unwrap();
        assert!(!a.exists("n").unwrap());
    }
}
