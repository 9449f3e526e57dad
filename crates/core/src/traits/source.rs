//! Remote suggestion source trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Suggestion;

/// The remote document listing marketplace suggestions.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Fetch and parse the suggestion list.
    ///
    /// Transport and status failures are `Error::RemoteFetch`; bodies that do
    /// not parse to a JSON array are `Error::MalformedPayload`.
    async fn fetch(&self) -> Result<Vec<Suggestion>>;
}
