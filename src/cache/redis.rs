// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redis-backed cache.
//!
//! Uses a [`ConnectionManager`](::redis::aio::ConnectionManager), which
//! multiplexes a single connection and reconnects transparently. The manager
//! is cheap to clone, so each operation works on its own clone.

use std::time::Duration;

use ::redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use async_trait::async_trait;

use super::{CacheError, CacheResult, KeyValueCache};

impl From<RedisError> for CacheError {
    fn from(e: RedisError) -> Self {
        if e.is_io_error() || e.is_connection_refusal() || e.is_timeout() {
            CacheError::Unavailable(e.to_string())
        } else {
            CacheError::Operation(e.to_string())
        }
    }
}

/// Shared Redis cache implementing [`KeyValueCache`].
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connect to the Redis server at `url` (e.g. `redis://localhost:6379/0`).
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = Client::open(url).map_err(|e| CacheError::Unavailable(e.to_string()))?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.manager.clone();
        // PX keeps sub-second TTLs meaningful; Redis rejects a zero expiry.
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        conn.pset_ex::<_, _, ()>(key, value, millis).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.manager.clone();
        Ok(conn.exists::<_, bool>(key).await?)
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.manager.clone();
        let removed: usize = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.manager.clone();
        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
