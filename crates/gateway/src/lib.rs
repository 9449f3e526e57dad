#![deny(unused)]
//! HTTP entry point for marketplace suggestions.
//!
//! This crate provides the remote suggestion source, the cached fetcher,
//! the dismissal recorder and the axum server exposing them.

pub mod dismissal;
pub mod server;
pub mod source;
pub mod suggestions;

pub use dismissal::DismissalRecorder;
pub use server::{CurrentUser, GatewayConfig, GatewayServer, USER_ID_HEADER};
pub use source::ReqwestSuggestionSource;
pub use suggestions::{SuggestionFetcher, SuggestionLookup};
