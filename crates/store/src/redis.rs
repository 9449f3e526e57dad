//! Redis implementations of the transient and user meta stores.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde_json::Value;
use std::time::Duration;

use marketplace_core::{
    traits::{TransientStore, UserMetaStore},
    types::UserId,
    Error, Result,
};

fn open_client(url: &str) -> Result<Client> {
    Client::open(url).map_err(|e| Error::storage(format!("Failed to connect to Redis: {}", e)))
}

async fn connection(client: &Client) -> Result<MultiplexedConnection> {
    client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| Error::storage(format!("Redis connection error: {}", e)))
}

/// Redis persistence for transients, stored as JSON with `SET EX`.
pub struct RedisTransientStore {
    client: Client,
    prefix: String,
}

impl RedisTransientStore {
    /// Create a new Redis transient store.
    pub fn new(url: &str, prefix: &str) -> Result<Self> {
        Ok(Self {
            client: open_client(url)?,
            prefix: prefix.to_string(),
        })
    }

    fn key(&self, key: &str) -> String {
        transient_key(&self.prefix, key)
    }
}

fn transient_key(prefix: &str, key: &str) -> String {
    format!("{}:transient:{}", prefix, key)
}

#[async_trait]
impl TransientStore for RedisTransientStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = connection(&self.client).await?;

        let data: Option<String> = conn
            .get(self.key(key))
            .await
            .map_err(|e| Error::storage(format!("Redis get error: {}", e)))?;

        match data {
            Some(json) => {
                let value = serde_json::from_str(&json)
                    .map_err(|e| Error::storage(format!("Failed to deserialize transient: {}", e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        let mut conn = connection(&self.client).await?;

        let json = serde_json::to_string(value)
            .map_err(|e| Error::storage(format!("Failed to serialize transient: {}", e)))?;

        // Redis rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(self.key(key), json, seconds)
            .await
            .map_err(|e| Error::storage(format!("Redis set error: {}", e)))?;

        Ok(())
    }
}

/// Redis persistence for per-user meta values.
pub struct RedisUserMetaStore {
    client: Client,
    prefix: String,
}

impl RedisUserMetaStore {
    /// Create a new Redis user meta store.
    pub fn new(url: &str, prefix: &str) -> Result<Self> {
        Ok(Self {
            client: open_client(url)?,
            prefix: prefix.to_string(),
        })
    }

    fn key(&self, user_id: &UserId, key: &str) -> String {
        user_meta_key(&self.prefix, user_id, key)
    }
}

fn user_meta_key(prefix: &str, user_id: &UserId, key: &str) -> String {
    format!("{}:user_meta:{}:{}", prefix, user_id, key)
}

#[async_trait]
impl UserMetaStore for RedisUserMetaStore {
    async fn get(&self, user_id: &UserId, key: &str) -> Result<Option<Value>> {
        let mut conn = connection(&self.client).await?;

        let data: Option<String> = conn
            .get(self.key(user_id, key))
            .await
            .map_err(|e| Error::storage(format!("Redis get error: {}", e)))?;

        // Values written by other tools may not be JSON; hand them back raw
        // so callers can classify them.
        Ok(data.map(|raw| serde_json::from_str(&raw).unwrap_or(Value::String(raw))))
    }

    async fn set(&self, user_id: &UserId, key: &str, value: &Value) -> Result<()> {
        let mut conn = connection(&self.client).await?;

        let json = serde_json::to_string(value)
            .map_err(|e| Error::storage(format!("Failed to serialize user meta: {}", e)))?;

        let _: () = conn
            .set(self.key(user_id, key), json)
            .await
            .map_err(|e| Error::storage(format!("Redis set error: {}", e)))?;

        Ok(())
    }
}
