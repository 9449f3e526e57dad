//! Metrics implementation using Prometheus.

use marketplace_core::{
    types::{DismissOutcome, FetchOutcome},
    Error, Result,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize Prometheus recorder and return the handle.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::governance(format!("Failed to install Prometheus recorder: {}", e)))?;

    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

/// Count a suggestion lookup by how it was served.
pub fn track_suggestions(outcome: FetchOutcome) {
    let cache = match outcome {
        FetchOutcome::CacheHit => "hit",
        FetchOutcome::Fetched | FetchOutcome::Fallback => "miss",
    };
    metrics::counter!("marketplace_suggestions_cache_total", "result" => cache).increment(1);

    if outcome != FetchOutcome::CacheHit {
        let fetch = if outcome == FetchOutcome::Fetched { "ok" } else { "fallback" };
        metrics::counter!("marketplace_suggestions_fetch_total", "outcome" => fetch).increment(1);
    }
}

/// Count a dismissal request by outcome.
pub fn track_dismissal(outcome: &str) {
    metrics::counter!("marketplace_dismissals_total", "outcome" => outcome.to_string()).increment(1);
}

/// Count a completed dismissal.
pub fn track_dismiss_outcome(outcome: DismissOutcome) {
    track_dismissal(outcome.as_str());
}
