#![deny(unused)]
//! Marketplace suggestions service.
//!
//! Serves cached marketplace add-on suggestions and records per-user
//! dismissals behind an anti-forgery nonce.

use std::sync::Arc;
use std::time::Duration;

use marketplace_core::{config::AppConfig, traits::NonceVerifier};
use marketplace_gateway::{
    DismissalRecorder, GatewayConfig, GatewayServer, ReqwestSuggestionSource, SuggestionFetcher,
};
use marketplace_governance::HmacNonceVerifier;
use marketplace_store::Stores;
use secrecy::Secret;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config ({}), using defaults", e);
        AppConfig::default()
    });

    marketplace_governance::configure_tracing(&config.governance)?;

    tracing::info!("Starting marketplace-suggestions v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Stores
    // =========================================================================
    let stores = Stores::from_config(&config.store)?;

    // =========================================================================
    // Suggestion fetcher
    // =========================================================================
    let source = Arc::new(ReqwestSuggestionSource::new(&config.suggestions)?);
    tracing::info!(url = %source.url(), "Remote suggestion source configured");

    let fetcher = SuggestionFetcher::new(stores.transients.clone(), source).with_ttls(
        config.suggestions.success_ttl(),
        config.suggestions.fallback_ttl(),
    );

    // =========================================================================
    // Dismissals and nonces
    // =========================================================================
    let recorder = DismissalRecorder::new(stores.user_meta.clone());

    let secret = match config.governance.nonce_secret.clone() {
        Some(secret) => secret,
        None => {
            tracing::warn!("No nonce secret configured; generated one for this process only");
            Secret::new(uuid::Uuid::new_v4().to_string())
        }
    };
    let nonces: Arc<dyn NonceVerifier> = Arc::new(HmacNonceVerifier::new(
        secret,
        Duration::from_secs(config.governance.nonce_lifetime_secs),
    ));

    // =========================================================================
    // Gateway
    // =========================================================================
    let gateway_config = GatewayConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        enable_cors: config.server.enable_cors,
        enable_tracing: true,
    };

    let mut server = GatewayServer::new(gateway_config, fetcher, recorder, nonces);

    if config.governance.metrics_enabled {
        let handle = marketplace_governance::setup_metrics_recorder()?;
        server = server.with_metrics(handle);
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Gateway initialized"
    );

    server.run().await?;

    Ok(())
}
