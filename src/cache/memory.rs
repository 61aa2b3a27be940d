// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process LRU cache with per-entry expiry.
//!
//! Expired entries are dropped lazily when touched. When the cache is full the
//! least recently used entry is evicted, which for nonces means the oldest
//! outstanding challenge is invalidated first.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;

use super::{CacheError, CacheResult, KeyValueCache};

/// Cached value + absolute expiry.
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// In-process LRU cache implementing [`KeyValueCache`].
pub struct InMemoryCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
}

impl InMemoryCache {
    /// Create a new cache holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Read the live value stored under `key`, if any.
    pub fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut cache = self.lock()?;
        match cache.get(key) {
            Some(entry) if entry.is_live() => Ok(Some(entry.value.clone())),
            Some(_) => {
                cache.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Number of entries currently held, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> CacheResult<std::sync::MutexGuard<'_, LruCache<String, CacheEntry>>> {
        self.cache
            .lock()
            .map_err(|_| CacheError::Operation("in-memory cache lock poisoned".to_string()))
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl KeyValueCache for InMemoryCache {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut cache = self.lock()?;
        cache.put(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut cache = self.lock()?;
        Ok(cache.pop(key).is_some_and(|entry| entry.is_live()))
    }

    async fn ping(&self) -> CacheResult<()> {
        self.lock().map(|_| ())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn close(&self) -> CacheResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_exists() {
        let cache = InMemoryCache::new(10);
        assert!(!cache.exists("nonce:abc").await.unwrap());

        cache
            .set_ex("nonce:abc", "abc", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.exists("nonce:abc").await.unwrap());
        assert_eq!(cache.get("nonce:abc").unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn delete_reports_removal_once() {
        let cache = InMemoryCache::new(10);
        cache
            .set_ex("nonce:abc", "abc", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.delete("nonce:abc").await.unwrap());
        assert!(!cache.delete("nonce:abc").await.unwrap());
        assert!(!cache.exists("nonce:abc").await.unwrap());
    }

    #[tokio::test]
    async fn close_drops_outstanding_entries() {
        let cache = InMemoryCache::new(10);
        cache
            .set_ex("nonce:abc", "abc", Duration::from_secs(60))
            .await
            .unwrap();

        cache.close().await.unwrap();
        assert!(cache.is_empty());
        assert!(!cache.exists("nonce:abc").await.unwrap());
    }

    #[tokio::test]
    async fn ttl_expiry() {
        let cache = InMemoryCache::new(10);
        cache
            .set_ex("nonce:abc", "abc", Duration::from_millis(1))
            .await
            .unwrap();

        // Wait for TTL to expire
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(!cache.exists("nonce:abc").await.unwrap());
        assert!(!cache.delete("nonce:abc").await.unwrap());
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache = InMemoryCache::new(2);
        let ttl = Duration::from_secs(60);
        cache.set_ex("a", "1", ttl).await.unwrap();
        cache.set_ex("b", "2", ttl).await.unwrap();
        cache.set_ex("c", "3", ttl).await.unwrap();

        assert!(!cache.exists("a").await.unwrap());
        assert!(cache.exists("b").await.unwrap());
        assert!(cache.exists("c").await.unwrap());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cache = InMemoryCache::new(0);
        assert!(cache.is_empty());
    }
}
