#![deny(unused)]
//! Governance for the marketplace suggestions service.
//!
//! This crate provides:
//! - Log and trace subscriber setup
//! - Prometheus metrics
//! - Anti-forgery nonces for state-changing requests
//! - Text field sanitization

pub mod metrics;
pub mod nonce;
pub mod sanitize;
pub mod tracing_layer;

pub use self::metrics::{setup_metrics_recorder, track_dismiss_outcome, track_dismissal, track_suggestions};
pub use nonce::HmacNonceVerifier;
pub use sanitize::TextSanitizer;
pub use tracing_layer::configure_tracing;
