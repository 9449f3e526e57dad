//! Axum-based HTTP server for the suggestion endpoints.

use async_trait::async_trait;
use axum::{
    extract::{Form, FromRequestParts, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use marketplace_core::{
    traits::NonceVerifier,
    types::{AjaxEnvelope, UserId, DISMISS_NONCE_ACTION},
    Result,
};
use marketplace_governance::{track_dismiss_outcome, track_dismissal};

use crate::dismissal::DismissalRecorder;
use crate::suggestions::SuggestionFetcher;

/// Header carrying the authenticated user id, set by the fronting host.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Enable CORS.
    pub enable_cors: bool,
    /// Enable request tracing.
    pub enable_tracing: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub fetcher: SuggestionFetcher,
    pub recorder: DismissalRecorder,
    pub nonces: Arc<dyn NonceVerifier>,
}

use metrics_exporter_prometheus::PrometheusHandle;

/// Gateway server.
pub struct GatewayServer {
    config: GatewayConfig,
    state: Arc<AppState>,
    metrics_handle: Option<PrometheusHandle>,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(
        config: GatewayConfig,
        fetcher: SuggestionFetcher,
        recorder: DismissalRecorder,
        nonces: Arc<dyn NonceVerifier>,
    ) -> Self {
        Self {
            config,
            state: Arc::new(AppState {
                fetcher,
                recorder,
                nonces,
            }),
            metrics_handle: None,
        }
    }

    /// Set metrics handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/ajax/marketplace_suggestions", get(suggestions_handler))
            .route(
                "/ajax/add_dismissed_marketplace_suggestion",
                post(dismiss_handler),
            )
            .route(
                "/ajax/dismissed_marketplace_suggestions",
                get(dismissed_handler),
            )
            .route(
                "/ajax/nonce/add_dismissed_marketplace_suggestion",
                get(nonce_handler),
            )
            .with_state(self.state.clone());

        if let Some(handle) = &self.metrics_handle {
            let handle = handle.clone();
            router = router.route("/metrics", get(move || async move { handle.render() }));
        }

        if self.config.enable_cors {
            router = router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any));
        }

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| marketplace_core::Error::gateway(format!("Failed to bind: {}", e)))?;

        tracing::info!(addr = %addr, "Gateway server starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| marketplace_core::Error::gateway(format!("Server error: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// The user a request acts for, taken from [`USER_ID_HEADER`].
///
/// Requests without it are rejected with an empty 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| CurrentUser(UserId::new(id)))
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Form body of a dismissal request.
#[derive(Debug, Deserialize)]
pub struct DismissRequest {
    /// Suggestion slug to dismiss.
    pub slug: Option<String>,
    /// Anti-forgery token, preferred field.
    #[serde(rename = "_ajax_nonce")]
    pub ajax_nonce: Option<String>,
    /// Anti-forgery token, fallback field.
    #[serde(rename = "_wpnonce")]
    pub wp_nonce: Option<String>,
}

impl DismissRequest {
    /// The submitted token, if any.
    pub fn nonce(&self) -> Option<&str> {
        self.ajax_nonce
            .as_deref()
            .or(self.wp_nonce.as_deref())
    }
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Suggestion data handler.
async fn suggestions_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    let trace_id = Uuid::new_v4().to_string();
    tracing::info!(trace_id = %trace_id, user_id = %user, "Serving marketplace suggestions");

    Json(AjaxEnvelope::success(state.fetcher.get_suggestions().await))
}

/// Dismissal handler.
///
/// Every path ends with an empty 200 so callers cannot tell a recorded
/// dismissal from a rejected one.
async fn dismiss_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    form: Option<Form<DismissRequest>>,
) -> StatusCode {
    let trace_id = Uuid::new_v4().to_string();

    let Some(Form(request)) = form else {
        tracing::debug!(trace_id = %trace_id, "Dismissal body could not be parsed");
        track_dismissal("bad_request");
        return StatusCode::OK;
    };

    let token = request.nonce().unwrap_or_default();
    if !state
        .nonces
        .verify(token, DISMISS_NONCE_ACTION, &user)
        .is_valid()
    {
        tracing::warn!(trace_id = %trace_id, user_id = %user, "Dismissal nonce check failed");
        track_dismissal("invalid_nonce");
        return StatusCode::OK;
    }

    let slug = request.slug.unwrap_or_default();
    match state.recorder.dismiss(&user, &slug).await {
        Ok(outcome) => {
            tracing::info!(
                trace_id = %trace_id,
                user_id = %user,
                outcome = outcome.as_str(),
                "Dismissal processed"
            );
            track_dismiss_outcome(outcome);
        }
        Err(e) => {
            tracing::error!(trace_id = %trace_id, user_id = %user, error = %e, "Dismissal failed");
            track_dismissal("error");
        }
    }

    StatusCode::OK
}

/// Dismissed slugs for the current user.
async fn dismissed_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    match state.recorder.dismissed_suggestions(&user).await {
        Ok(slugs) => (StatusCode::OK, Json(AjaxEnvelope::success(slugs))).into_response(),
        Err(e) => {
            tracing::error!(user_id = %user, error = %e, "Failed to read dismissed suggestions");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Issue a dismissal nonce for the current user.
async fn nonce_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    Json(AjaxEnvelope::success(
        state.nonces.create(DISMISS_NONCE_ACTION, &user),
    ))
}
