//! Suggestion payload types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single marketplace suggestion.
///
/// The schema belongs to the remote endpoint and is passed through untouched.
pub type Suggestion = Value;

/// Cache key under which the fetched suggestion list is stored.
pub const SUGGESTIONS_CACHE_KEY: &str = "wc_marketplace_suggestions";

/// Outcome of a single suggestion lookup, for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Served from the cache without touching the remote endpoint.
    CacheHit,
    /// Fetched from the remote endpoint and cached with the long TTL.
    Fetched,
    /// Remote fetch failed; the empty sentinel was cached with the short TTL.
    Fallback,
}

impl FetchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheHit => "cache_hit",
            Self::Fetched => "fetched",
            Self::Fallback => "fallback",
        }
    }
}

/// Success envelope wrapping AJAX responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjaxEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> AjaxEnvelope<T> {
    /// Wrap data in a success envelope.
    pub fn success(data: T) -> Self {
        Self { success: true, data }
    }
}
