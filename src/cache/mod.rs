// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key-Value Cache
//!
//! Ephemeral key-value storage with per-key expiry, used for SIWE nonces.
//!
//! Two backends implement [`KeyValueCache`]:
//!
//! - [`InMemoryCache`] - in-process LRU, for tests and single-instance deployments
//! - [`RedisCache`] - shared Redis, for horizontally scaled deployments
//!
//! Every operation touches exactly one key and is atomic on that key. There
//! are no multi-key transactions.

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

pub use memory::InMemoryCache;
pub use self::redis::RedisCache;

/// Errors raised by a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache operation failed: {0}")]
    Operation(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Single-key cache operations with TTL.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl`. Overwrites any existing entry.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Whether `key` is currently present (not expired, not deleted).
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Remove `key`. Returns `true` iff a live entry was removed.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Round-trip check used by readiness checks.
    async fn ping(&self) -> CacheResult<()>;

    /// Backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Release backend state at shutdown. Network connections close when
    /// the last handle is dropped.
    async fn close(&self) -> CacheResult<()> {
        Ok(())
    }
}
