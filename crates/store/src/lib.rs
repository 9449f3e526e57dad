#![deny(unused)]
//! Storage backends for the marketplace suggestions service.
//!
//! Each collaborator store has an in-memory implementation (the default,
//! DashMap-backed) and a Redis implementation for shared deployments.

pub mod memory;
pub mod redis;

use std::sync::Arc;

use marketplace_core::{
    config::StoreConfig,
    traits::{TransientStore, UserMetaStore},
    Result,
};

pub use memory::{InMemoryTransientStore, InMemoryUserMetaStore};
pub use self::redis::{RedisTransientStore, RedisUserMetaStore};

/// The pair of stores the service needs.
pub struct Stores {
    pub transients: Arc<dyn TransientStore>,
    pub user_meta: Arc<dyn UserMetaStore>,
}

impl Stores {
    /// In-memory stores, local to this process.
    pub fn in_memory() -> Self {
        Self {
            transients: Arc::new(InMemoryTransientStore::new()),
            user_meta: Arc::new(InMemoryUserMetaStore::new()),
        }
    }

    /// Select backends from configuration: Redis when a URL is set,
    /// in-memory otherwise.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        match &config.redis_url {
            Some(url) => {
                tracing::info!(prefix = %config.key_prefix, "Initializing Redis stores");
                Ok(Self {
                    transients: Arc::new(RedisTransientStore::new(url, &config.key_prefix)?),
                    user_meta: Arc::new(RedisUserMetaStore::new(url, &config.key_prefix)?),
                })
            }
            None => {
                tracing::info!("Initializing in-memory stores");
                Ok(Self::in_memory())
            }
        }
    }
}
