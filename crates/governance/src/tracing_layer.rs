//! Log and trace subscriber configuration.

use marketplace_core::{config::GovernanceConfig, Error, Result};
use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Configure stdout logging and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set,
/// OpenTelemetry trace export.
pub fn configure_tracing(config: &GovernanceConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,marketplace=debug".into()),
    );

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        let provider = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint.clone()),
            )
            .with_trace_config(
                sdktrace::Config::default().with_resource(Resource::new(vec![KeyValue::new(
                    "service.name",
                    "marketplace-suggestions",
                )])),
            )
            .install_batch(runtime::Tokio)
            .map_err(|e| Error::governance(format!("Failed to install OTLP pipeline: {}", e)))?;

        let tracer = provider.tracer("marketplace-suggestions");
        opentelemetry::global::set_tracer_provider(provider);
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        registry
            .with(otel_layer)
            .try_init()
            .map_err(|e| Error::governance(format!("Failed to install subscriber: {}", e)))?;

        tracing::info!(endpoint = %endpoint, "OpenTelemetry tracing initialized");
    } else {
        registry
            .try_init()
            .map_err(|e| Error::governance(format!("Failed to install subscriber: {}", e)))?;
    }

    Ok(())
}
