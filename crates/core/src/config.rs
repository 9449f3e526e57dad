use config::{Config, Environment, File};
use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::Result;

/// Remote document listing marketplace suggestions.
pub const DEFAULT_SUGGESTIONS_URL: &str =
    "https://d3t0oesq8995hv.cloudfront.net/add-ons/marketplace-suggestions.json";

/// User agent sent with every suggestion fetch.
pub const DEFAULT_USER_AGENT: &str = "WooCommerce Marketplace Suggestions";

pub const DAY_IN_SECONDS: u64 = 24 * 60 * 60;
pub const WEEK_IN_SECONDS: u64 = 7 * DAY_IN_SECONDS;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub suggestions: SuggestionsConfig,
    pub store: StoreConfig,
    pub governance: GovernanceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SuggestionsConfig {
    pub remote_url: Url,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub success_ttl_secs: u64,
    pub fallback_ttl_secs: u64,
}

impl SuggestionsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn success_ttl(&self) -> Duration {
        Duration::from_secs(self.success_ttl_secs)
    }

    pub fn fallback_ttl(&self) -> Duration {
        Duration::from_secs(self.fallback_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub redis_url: Option<String>,
    pub key_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GovernanceConfig {
    pub nonce_secret: Option<Secret<String>>,
    pub nonce_lifetime_secs: u64,
    pub json_logs: bool,
    pub metrics_enabled: bool,
}

impl AppConfig {
    /// Load layered configuration; any source or shape problem is an
    /// `Error::Config`.
    pub fn load() -> Result<Self> {
        let env = std::env::var("MARKETPLACE_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__SERVER__PORT=3000 to server.port
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(s.try_deserialize()?)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 3000,
                enable_cors: true,
            },
            suggestions: SuggestionsConfig {
                remote_url: Url::parse(DEFAULT_SUGGESTIONS_URL).expect("default suggestions URL is valid"),
                user_agent: DEFAULT_USER_AGENT.into(),
                timeout_ms: 5000,
                success_ttl_secs: WEEK_IN_SECONDS,
                fallback_ttl_secs: DAY_IN_SECONDS,
            },
            store: StoreConfig {
                redis_url: None,
                key_prefix: "marketplace".into(),
            },
            governance: GovernanceConfig {
                nonce_secret: None,
                nonce_lifetime_secs: DAY_IN_SECONDS,
                json_logs: false,
                metrics_enabled: true,
            },
        }
    }
}
