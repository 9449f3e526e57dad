//! Read-through cache in front of the remote suggestion source.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use marketplace_core::{
    config::{DAY_IN_SECONDS, WEEK_IN_SECONDS},
    traits::{SuggestionSource, TransientStore},
    types::{FetchOutcome, Suggestion, SUGGESTIONS_CACHE_KEY},
};
use marketplace_governance::track_suggestions;

/// Suggestions together with how they were obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionLookup {
    pub suggestions: Vec<Suggestion>,
    pub outcome: FetchOutcome,
}

/// Serves marketplace suggestions from a transient cache, refilling it from
/// the remote source on a miss.
///
/// A successful fetch is cached for `success_ttl`. Any failure caches an
/// empty list for `fallback_ttl` so the remote endpoint is retried at most
/// once per fallback window.
pub struct SuggestionFetcher {
    cache: Arc<dyn TransientStore>,
    source: Arc<dyn SuggestionSource>,
    success_ttl: Duration,
    fallback_ttl: Duration,
}

impl SuggestionFetcher {
    /// Create a fetcher with a one week success TTL and a one day fallback TTL.
    pub fn new(cache: Arc<dyn TransientStore>, source: Arc<dyn SuggestionSource>) -> Self {
        Self {
            cache,
            source,
            success_ttl: Duration::from_secs(WEEK_IN_SECONDS),
            fallback_ttl: Duration::from_secs(DAY_IN_SECONDS),
        }
    }

    /// Override both TTLs.
    pub fn with_ttls(mut self, success_ttl: Duration, fallback_ttl: Duration) -> Self {
        self.success_ttl = success_ttl;
        self.fallback_ttl = fallback_ttl;
        self
    }

    /// Return the current suggestion list. Never fails; problems yield `[]`.
    pub async fn get_suggestions(&self) -> Vec<Suggestion> {
        self.lookup().await.suggestions
    }

    /// Like [`get_suggestions`](Self::get_suggestions), also reporting the outcome.
    pub async fn lookup(&self) -> SuggestionLookup {
        let lookup = match self.cached().await {
            Some(suggestions) => SuggestionLookup {
                suggestions,
                outcome: FetchOutcome::CacheHit,
            },
            None => self.refresh().await,
        };

        tracing::debug!(
            outcome = lookup.outcome.as_str(),
            count = lookup.suggestions.len(),
            "Marketplace suggestions served"
        );
        track_suggestions(lookup.outcome);
        lookup
    }

    async fn cached(&self) -> Option<Vec<Suggestion>> {
        match self.cache.get(SUGGESTIONS_CACHE_KEY).await {
            Ok(Some(Value::Array(items))) => Some(items),
            Ok(Some(other)) => {
                tracing::warn!(
                    value = %other,
                    "Cached suggestions are not a list, serving empty"
                );
                Some(Vec::new())
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Suggestion cache read failed, treating as miss");
                None
            }
        }
    }

    async fn refresh(&self) -> SuggestionLookup {
        let (suggestions, outcome, ttl) = match self.source.fetch().await {
            Ok(items) if !items.is_empty() => (items, FetchOutcome::Fetched, self.success_ttl),
            Ok(_) => {
                tracing::info!("Remote returned no suggestions, caching empty fallback");
                (Vec::new(), FetchOutcome::Fallback, self.fallback_ttl)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Suggestion fetch failed, caching empty fallback");
                (Vec::new(), FetchOutcome::Fallback, self.fallback_ttl)
            }
        };

        let value = Value::Array(suggestions.clone());
        if let Err(e) = self.cache.set(SUGGESTIONS_CACHE_KEY, &value, ttl).await {
            tracing::warn!(error = %e, "Failed to cache marketplace suggestions");
        }

        SuggestionLookup { suggestions, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace_core::mocks::{MockReply, MockSuggestionSource, RecordingTransientStore};
    use marketplace_store::InMemoryTransientStore;
    use serde_json::json;

    const WEEK: Duration = Duration::from_secs(WEEK_IN_SECONDS);
    const DAY: Duration = Duration::from_secs(DAY_IN_SECONDS);

    #[tokio::test]
    async fn test_success_is_cached_for_a_week() {
        let cache = Arc::new(RecordingTransientStore::new());
        let source = Arc::new(MockSuggestionSource::returning(vec![json!({"id": "x"})]));
        let fetcher = SuggestionFetcher::new(cache.clone(), source.clone());

        let lookup = fetcher.lookup().await;
        assert_eq!(lookup.suggestions, vec![json!({"id": "x"})]);
        assert_eq!(lookup.outcome, FetchOutcome::Fetched);

        let writes = cache.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].key, SUGGESTIONS_CACHE_KEY);
        assert_eq!(writes[0].value, json!([{"id": "x"}]));
        assert_eq!(writes[0].ttl, WEEK);
    }

    #[tokio::test]
    async fn test_failure_caches_empty_for_a_day() {
        let cache = Arc::new(RecordingTransientStore::new());
        let source = Arc::new(MockSuggestionSource::failing("HTTP 500"));
        let fetcher = SuggestionFetcher::new(cache.clone(), source);

        let lookup = fetcher.lookup().await;
        assert!(lookup.suggestions.is_empty());
        assert_eq!(lookup.outcome, FetchOutcome::Fallback);

        let writes = cache.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].value, json!([]));
        assert_eq!(writes[0].ttl, DAY);
    }

    #[tokio::test]
    async fn test_malformed_and_empty_payloads_fall_back() {
        for reply in [
            MockReply::Malformed("object".into()),
            MockReply::Suggestions(Vec::new()),
        ] {
            let cache = Arc::new(RecordingTransientStore::new());
            let source = Arc::new(MockSuggestionSource::new(vec![reply]));
            let fetcher = SuggestionFetcher::new(cache.clone(), source);

            assert!(fetcher.get_suggestions().await.is_empty());
            assert_eq!(cache.writes()[0].ttl, DAY);
        }
    }

    #[tokio::test]
    async fn test_cached_sentinel_served_without_fetch() {
        let cache = Arc::new(RecordingTransientStore::with_entry(SUGGESTIONS_CACHE_KEY, json!([])));
        let source = Arc::new(MockSuggestionSource::returning(vec![json!({"id": "x"})]));
        let fetcher = SuggestionFetcher::new(cache.clone(), source.clone());

        let lookup = fetcher.lookup().await;
        assert!(lookup.suggestions.is_empty());
        assert_eq!(lookup.outcome, FetchOutcome::CacheHit);
        assert_eq!(source.call_count(), 0);
        assert!(cache.writes().is_empty());
    }

    #[tokio::test]
    async fn test_non_list_cache_value_served_as_empty() {
        let cache = Arc::new(RecordingTransientStore::with_entry(SUGGESTIONS_CACHE_KEY, json!("[]")));
        let source = Arc::new(MockSuggestionSource::returning(vec![json!({"id": "x"})]));
        let fetcher = SuggestionFetcher::new(cache, source.clone());

        assert!(fetcher.get_suggestions().await.is_empty());
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cache_read_failure_falls_through_to_source() {
        let cache = Arc::new(RecordingTransientStore::failing_reads());
        let source = Arc::new(MockSuggestionSource::returning(vec![json!({"id": "x"})]));
        let fetcher = SuggestionFetcher::new(cache.clone(), source.clone());

        assert_eq!(fetcher.get_suggestions().await, vec![json!({"id": "x"})]);
        assert_eq!(source.call_count(), 1);
        assert_eq!(cache.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_refetched_only_after_a_week() {
        let cache = Arc::new(InMemoryTransientStore::new());
        let source = Arc::new(MockSuggestionSource::new(vec![
            MockReply::Suggestions(vec![json!({"id": "first"})]),
            MockReply::Suggestions(vec![json!({"id": "second"})]),
        ]));
        let fetcher = SuggestionFetcher::new(cache, source.clone());

        assert_eq!(fetcher.get_suggestions().await, vec![json!({"id": "first"})]);

        tokio::time::advance(WEEK - Duration::from_secs(1)).await;
        assert_eq!(fetcher.get_suggestions().await, vec![json!({"id": "first"})]);
        assert_eq!(source.call_count(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(fetcher.get_suggestions().await, vec![json!({"id": "second"})]);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_retried_after_a_day() {
        let cache = Arc::new(InMemoryTransientStore::new());
        let source = Arc::new(MockSuggestionSource::new(vec![
            MockReply::RemoteError("connection refused".into()),
            MockReply::Suggestions(vec![json!({"id": "x"})]),
        ]));
        let fetcher = SuggestionFetcher::new(cache.clone(), source.clone());

        assert!(fetcher.get_suggestions().await.is_empty());
        assert_eq!(cache.ttl_remaining(SUGGESTIONS_CACHE_KEY), Some(DAY));

        tokio::time::advance(DAY - Duration::from_secs(1)).await;
        assert!(fetcher.get_suggestions().await.is_empty());
        assert_eq!(source.call_count(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(fetcher.get_suggestions().await, vec![json!({"id": "x"})]);
        assert_eq!(source.call_count(), 2);
        assert_eq!(cache.ttl_remaining(SUGGESTIONS_CACHE_KEY), Some(WEEK));
    }
}
