// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Single-use nonce store.
//!
//! Nonces live in the shared [`KeyValueCache`] under `nonce:<value>` with a
//! TTL. A nonce is consumed by deleting its key; only the caller whose delete
//! actually removed the key may treat the nonce as spent by them.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheResult, KeyValueCache};

/// Cache key prefix for outstanding nonces.
pub const NONCE_KEY_PREFIX: &str = "nonce:";

/// Length of nonces produced by [`::siwe::generate_nonce`].
pub const NONCE_LENGTH: usize = 17;

/// Issues, checks and consumes SIWE nonces.
#[derive(Clone)]
pub struct NonceStore {
    cache: Arc<dyn KeyValueCache>,
    ttl: Duration,
}

impl NonceStore {
    pub fn new(cache: Arc<dyn KeyValueCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a fresh nonce and register it with the configured TTL.
    pub async fn generate_nonce(&self) -> CacheResult<String> {
        let nonce = ::siwe::generate_nonce();
        self.cache
            .set_ex(&cache_key(&nonce), &nonce, self.ttl)
            .await?;
        tracing::debug!(ttl_secs = self.ttl.as_secs(), "nonce issued");
        Ok(nonce)
    }

    /// Whether `nonce` is outstanding (issued, unexpired, unconsumed).
    pub async fn is_nonce_valid(&self, nonce: &str) -> CacheResult<bool> {
        self.cache.exists(&cache_key(nonce)).await
    }

    /// Consume `nonce`. Returns `true` iff this call removed it.
    pub async fn clear_nonce(&self, nonce: &str) -> CacheResult<bool> {
        self.cache.delete(&cache_key(nonce)).await
    }
}

fn cache_key(nonce: &str) -> String {
    format!("{NONCE_KEY_PREFIX}{nonce}")
}
