use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use marketplace_core::mocks::{MockReply, MockSuggestionSource};
use marketplace_core::types::{UserId, DISMISSED_META_KEY, SUGGESTIONS_CACHE_KEY};
use marketplace_gateway::{DismissalRecorder, GatewayConfig, GatewayServer, SuggestionFetcher};
use marketplace_governance::HmacNonceVerifier;
use marketplace_store::{InMemoryTransientStore, InMemoryUserMetaStore};
use marketplace_core::traits::{TransientStore, UserMetaStore};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

// =============================================================================
// Full-stack wiring with in-memory stores and real nonces
// =============================================================================

struct System {
    app: Router,
    source: Arc<MockSuggestionSource>,
    transients: Arc<InMemoryTransientStore>,
    user_meta: Arc<InMemoryUserMetaStore>,
}

fn system(replies: Vec<MockReply>) -> System {
    let source = Arc::new(MockSuggestionSource::new(replies));
    let transients = Arc::new(InMemoryTransientStore::new());
    let user_meta = Arc::new(InMemoryUserMetaStore::new());
    let nonces = Arc::new(HmacNonceVerifier::new(
        Secret::new("system-test-secret".to_string()),
        DAY,
    ));

    let server = GatewayServer::new(
        GatewayConfig::default(),
        SuggestionFetcher::new(transients.clone(), source.clone()),
        DismissalRecorder::new(user_meta.clone()),
        nonces,
    );

    System {
        app: server.build_router(),
        source,
        transients,
        user_meta,
    }
}

async fn get_json(app: &Router, uri: &str, user: &str) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("x-user-id", user)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn post_dismiss(app: &Router, user: &str, body: String) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ajax/add_dismissed_marketplace_suggestion")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .header("x-user-id", user)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

async fn nonce_for(app: &Router, user: &str) -> String {
    let json = get_json(app, "/ajax/nonce/add_dismissed_marketplace_suggestion", user).await;
    json["data"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_dismissal_flow_with_issued_nonce() {
    let sys = system(vec![MockReply::Suggestions(vec![])]);
    let nonce = nonce_for(&sys.app, "42").await;

    let status = post_dismiss(
        &sys.app,
        "42",
        format!("slug=sale-banner&_ajax_nonce={}", nonce),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stored = sys
        .user_meta
        .get(&UserId::from("42"), DISMISSED_META_KEY)
        .await
        .unwrap();
    assert_eq!(stored, Some(json!(["sale-banner"])));

    let listed = get_json(&sys.app, "/ajax/dismissed_marketplace_suggestions", "42").await;
    assert_eq!(listed["data"], json!(["sale-banner"]));
}

#[tokio::test]
async fn test_nonce_from_another_user_is_rejected() {
    let sys = system(vec![MockReply::Suggestions(vec![])]);
    let nonce = nonce_for(&sys.app, "1").await;

    let status = post_dismiss(&sys.app, "2", format!("slug=sale-banner&_ajax_nonce={}", nonce)).await;
    assert_eq!(status, StatusCode::OK);

    let stored = sys
        .user_meta
        .get(&UserId::from("2"), DISMISSED_META_KEY)
        .await
        .unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn test_malformed_stored_list_is_repaired_by_dismissal() {
    let sys = system(vec![MockReply::Suggestions(vec![])]);
    let user = UserId::from("5");
    sys.user_meta
        .set(&user, DISMISSED_META_KEY, &json!("legacy-string"))
        .await
        .unwrap();

    let listed = get_json(&sys.app, "/ajax/dismissed_marketplace_suggestions", "5").await;
    assert_eq!(listed["data"], json!([]));

    let nonce = nonce_for(&sys.app, "5").await;
    post_dismiss(&sys.app, "5", format!("slug=orders&_ajax_nonce={}", nonce)).await;

    let stored = sys.user_meta.get(&user, DISMISSED_META_KEY).await.unwrap();
    assert_eq!(stored, Some(json!(["orders"])));
}

#[tokio::test(start_paused = true)]
async fn test_suggestions_fallback_then_recovery() {
    let sys = system(vec![
        MockReply::RemoteError("HTTP 500".into()),
        MockReply::Suggestions(vec![json!({"id": "x"})]),
    ]);

    let first = get_json(&sys.app, "/ajax/marketplace_suggestions", "1").await;
    assert_eq!(first, json!({"success": true, "data": []}));
    assert_eq!(
        sys.transients.get(SUGGESTIONS_CACHE_KEY).await.unwrap(),
        Some(json!([]))
    );

    tokio::time::advance(DAY / 2).await;
    let cached = get_json(&sys.app, "/ajax/marketplace_suggestions", "1").await;
    assert_eq!(cached["data"], json!([]));
    assert_eq!(sys.source.call_count(), 1);

    tokio::time::advance(DAY / 2).await;
    let recovered = get_json(&sys.app, "/ajax/marketplace_suggestions", "1").await;
    assert_eq!(recovered["data"], json!([{"id": "x"}]));
    assert_eq!(sys.source.call_count(), 2);
}
