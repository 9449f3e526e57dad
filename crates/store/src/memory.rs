//! In-memory store implementations using DashMap.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

use marketplace_core::{
    traits::{TransientStore, UserMetaStore},
    types::UserId,
    Result,
};

/// Cached value with its expiry deadline.
#[derive(Debug, Clone)]
struct TransientEntry {
    value: Value,
    expires_at: Instant,
}

impl TransientEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory transient store using DashMap for concurrent access.
///
/// Expiry is checked lazily on read against the tokio clock.
#[derive(Debug, Default)]
pub struct InMemoryTransientStore {
    entries: DashMap<String, TransientEntry>,
}

impl InMemoryTransientStore {
    /// Create a new in-memory transient store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time left before `key` expires.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.expires_at.saturating_duration_since(Instant::now()))
    }

    /// Drop expired entries.
    pub fn cleanup(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }
}

#[async_trait]
impl TransientStore for InMemoryTransientStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
            drop(entry);
            tracing::trace!(key = key, "Evicting expired transient");
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        tracing::trace!(key = key, ttl_secs = ttl.as_secs(), "Storing transient in memory");
        self.entries.insert(
            key.to_string(),
            TransientEntry {
                value: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

/// In-memory user meta store.
#[derive(Debug, Default)]
pub struct InMemoryUserMetaStore {
    entries: DashMap<(String, String), Value>,
}

impl InMemoryUserMetaStore {
    /// Create a new in-memory user meta store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserMetaStore for InMemoryUserMetaStore {
    async fn get(&self, user_id: &UserId, key: &str) -> Result<Option<Value>> {
        Ok(self
            .entries
            .get(&(user_id.0.clone(), key.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn set(&self, user_id: &UserId, key: &str, value: &Value) -> Result<()> {
        self.entries
            .insert((user_id.0.clone(), key.to_string()), value.clone());
        Ok(())
    }
}
