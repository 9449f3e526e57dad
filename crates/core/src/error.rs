//! Error types for the marketplace suggestions service.

use thiserror::Error;

/// Result type alias using the service's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Remote Source Errors
    // =========================================================================
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // =========================================================================
    // Store Errors
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Gateway Errors
    // =========================================================================
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Governance error: {0}")]
    Governance(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a remote fetch error.
    pub fn remote_fetch(msg: impl Into<String>) -> Self {
        Self::RemoteFetch(msg.into())
    }

    /// Create a malformed payload error.
    pub fn malformed_payload(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a gateway error.
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Create a governance error.
    pub fn governance(msg: impl Into<String>) -> Self {
        Self::Governance(msg.into())
    }

}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
