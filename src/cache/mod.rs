//! Response caching
//!
//! Serialized responses are kept in a TTL-bounded cache keyed by a digest of
//! the normalized request.

use crate::config::CacheSettings;
use crate::results::ResultType;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::time::Duration;

/// Cache for serialized responses
#[derive(Clone)]
pub struct ResultCache {
    cache: Cache<String, Vec<u8>>,
}

impl ResultCache {
    /// Create a new result cache with specified TTL
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    /// Build from settings, `None` when caching is disabled
    pub fn from_settings(settings: &CacheSettings) -> Option<Self> {
        settings
            .enabled
            .then(|| Self::new(settings.ttl_seconds, settings.max_capacity))
    }

    /// Get a cached value
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key).await
    }

    /// Store a value
    pub async fn set(&self, key: String, value: Vec<u8>) {
        self.cache.insert(key, value).await;
    }

    /// Get cache size
    pub fn size(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// Cache key for a search request.
///
/// `normalized_text` must already be normalized, so that spellings which
/// match identically share one entry.
pub fn search_cache_key(
    normalized_text: &str,
    types: &BTreeSet<ResultType>,
    skip: usize,
    take: usize,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"search\0");
    hasher.update(normalized_text.as_bytes());
    for t in types {
        hasher.update(b"\0");
        hasher.update(t.as_str().as_bytes());
    }
    hasher.update(format!("\0{}\0{}", skip, take).as_bytes());

    format!("{:x}", hasher.finalize())
}

/// Cache key for a paginated listing of one resource
pub fn page_cache_key(resource: &str, skip: usize, take: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("list\0{}\0{}\0{}", resource, skip, take).as_bytes());
    format!("{:x}", hasher.finalize())
}
