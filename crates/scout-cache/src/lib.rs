//! Client-local key-value storage for the Scout storefront.
//!
//! The storefront keeps a handful of small blobs on the client (the
//! recent-search list being the main one). Storage is injected through the
//! [`KvStore`] trait so tests can swap in [`MemoryStore`] while the CLI
//! persists to disk with [`FileStore`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use scout_cache::{Cache, MemoryStore};
//!
//! let cache = Cache::new(Arc::new(MemoryStore::new()));
//! cache.set("greeting", &vec!["hello".to_string()]).unwrap();
//!
//! let value: Option<Vec<String>> = cache.get("greeting").unwrap();
//! assert_eq!(value, Some(vec!["hello".to_string()]));
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KvStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore};
}
