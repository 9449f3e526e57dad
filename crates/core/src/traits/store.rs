//! Store traits.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::Result;
use crate::types::UserId;

// =============================================================================
// Transient (TTL) Store
// =============================================================================

/// Key-value cache whose entries expire after a per-entry TTL.
///
/// Expired entries must read as absent.
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// Get a live value by key.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Set a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<()>;
}

// =============================================================================
// User Meta Store
// =============================================================================

/// Persistent per-user key-value store. Entries never expire.
#[async_trait]
pub trait UserMetaStore: Send + Sync {
    /// Get the value stored for a user under `key`.
    async fn get(&self, user_id: &UserId, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored for a user under `key`.
    async fn set(&self, user_id: &UserId, key: &str, value: &Value) -> Result<()>;
}
