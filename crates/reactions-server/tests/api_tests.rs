//! Integration tests for the reactions API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, against the in-memory store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use reactions_core::{EmojiPolicy, ReactionService, ReactionsConfig};
use reactions_db::ReactionStore;
use reactions_server::router::build_router;
use reactions_server::state::AppState;
use reactions_server::{build_state, load_config};
use reactions_types::{ItemId, ReactorState};
use serde_json::{Value, json};
use tower::ServiceExt;

/// `👍` percent-encoded for use in a request path.
const THUMBS_PATH: &str = "%F0%9F%91%8D";

fn make_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(ReactionService::new(
        ReactionStore::memory(),
        Arc::new(EmojiPolicy::default()),
    )))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn toggle_request(pid: &str, user: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::post(format!("/api/posts/{pid}/reactions/toggle"))
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(path: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).unwrap()
}

async fn toggle(state: &Arc<AppState>, pid: &str, user: &str, emoji: &str) -> (StatusCode, Value) {
    let response = build_router(Arc::clone(state))
        .oneshot(toggle_request(pid, Some(user), &json!({ "emoji": emoji })))
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_health() {
    let router = build_router(make_test_state());

    let response = router.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "memory");
}

#[tokio::test]
async fn test_allowed_lists_default_reactions_in_order() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(get_request("/api/reactions/allowed", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json["allowed"],
        json!(["👍", "😂", "🎉", "😢", "😡", "👏", "🙌", "👀"])
    );
}

#[tokio::test]
async fn test_toggle_on_then_off() {
    let state = make_test_state();

    let (status, json) = toggle(&state, "42", "1", "👍").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pid"], "42");
    assert_eq!(json["counts"], json!({ "👍": 1 }));
    assert_eq!(json["state"], "active");

    let (status, json) = toggle(&state, "42", "2", "👍").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["counts"], json!({ "👍": 2 }));

    let (status, json) = toggle(&state, "42", "1", "👍").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["counts"], json!({ "👍": 1 }));
    assert_eq!(json["state"], "inactive");
}

#[tokio::test]
async fn test_last_toggle_off_drops_symbol_from_counts() {
    let state = make_test_state();

    toggle(&state, "7", "1", "🎉").await;
    let (status, json) = toggle(&state, "7", "1", "🎉").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["counts"], json!({}));
}

#[tokio::test]
async fn test_toggle_as_guest_is_unauthorized() {
    let state = make_test_state();

    for user in [None, Some("0"), Some("  ")] {
        let response = build_router(Arc::clone(&state))
            .oneshot(toggle_request("42", user, &json!({ "emoji": "👍" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["error"], "Not logged in");
        assert_eq!(json["status"], 401);
    }

    let counts = state.service.counts(&ItemId::new("42")).await.unwrap();
    assert!(counts.is_empty());
}

#[tokio::test]
async fn test_toggle_disallowed_emoji_is_bad_request() {
    let state = make_test_state();

    let (status, json) = toggle(&state, "42", "1", "🦀").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("🦀"));
    let counts = state.service.counts(&ItemId::new("42")).await.unwrap();
    assert!(counts.is_empty());
}

#[tokio::test]
async fn test_toggle_blank_emoji_is_bad_request() {
    let state = make_test_state();

    let (status, _) = toggle(&state, "42", "1", "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_malformed_body_is_bad_request() {
    let state = make_test_state();

    let response = build_router(state)
        .oneshot(toggle_request("42", Some("1"), &json!({ "reaction": "👍" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_summary_includes_my_reactions() {
    let state = make_test_state();
    toggle(&state, "42", "1", "👍").await;
    toggle(&state, "42", "1", "😂").await;
    toggle(&state, "42", "2", "👍").await;

    let response = build_router(Arc::clone(&state))
        .oneshot(get_request("/api/posts/42/reactions", Some("1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["pid"], "42");
    assert_eq!(json["reactions"], json!({ "👍": 2, "😂": 1 }));
    let mut mine: Vec<String> = serde_json::from_value(json["myReactions"].clone()).unwrap();
    mine.sort();
    let mut expected = vec!["👍".to_owned(), "😂".to_owned()];
    expected.sort();
    assert_eq!(mine, expected);
}

#[tokio::test]
async fn test_summary_for_guest_has_no_own_reactions() {
    let state = make_test_state();
    toggle(&state, "42", "1", "👍").await;

    let response = build_router(state)
        .oneshot(get_request("/api/posts/42/reactions", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reactions"], json!({ "👍": 1 }));
    assert_eq!(json["myReactions"], json!([]));
}

#[tokio::test]
async fn test_summary_for_untouched_post_is_empty() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(get_request("/api/posts/999/reactions", Some("1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reactions"], json!({}));
    assert_eq!(json["myReactions"], json!([]));
}

#[tokio::test]
async fn test_reactors_list() {
    let state = make_test_state();
    toggle(&state, "42", "b", "👍").await;
    toggle(&state, "42", "a", "👍").await;

    let response = build_router(state)
        .oneshot(get_request(
            &format!("/api/posts/42/reactions/{THUMBS_PATH}/users"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["emoji"], "👍");
    assert_eq!(json["count"], 2);
    assert_eq!(json["users"], json!(["a", "b"]));
}

#[tokio::test]
async fn test_reactors_for_disallowed_emoji_is_bad_request() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(get_request("/api/posts/42/reactions/nope/users", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_broadcasts_update() {
    let state = make_test_state();
    let mut rx = state.subscribe();

    toggle(&state, "42", "1", "👏").await;

    let update = rx.recv().await.unwrap();
    assert_eq!(update.item_id, ItemId::new("42"));
    assert_eq!(update.user_id.as_str(), "1");
    assert_eq!(update.state, ReactorState::Active);
    assert_eq!(update.counts.len(), 1);
}

#[tokio::test]
async fn test_rejected_toggle_does_not_broadcast() {
    let state = make_test_state();
    let mut rx = state.subscribe();

    toggle(&state, "42", "1", "🦀").await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_build_state_uses_configured_allow_list() {
    let config = ReactionsConfig::parse("reactions:\n  allowed: [\"🔥\", \"👍\"]\n").unwrap();
    let state = build_state(&config).await.unwrap();

    let (status, _) = toggle(&state, "1", "1", "😂").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = toggle(&state, "1", "1", "🔥").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["counts"], json!({ "🔥": 1 }));
}

#[test]
fn test_load_config_missing_file_uses_defaults() {
    let config = load_config(std::path::Path::new("does-not-exist.yaml")).unwrap();

    assert_eq!(config.reactions.allowed.len(), 8);
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(get_request("/api/nonexistent", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggle_trims_padded_emoji() {
    let state = make_test_state();

    let (status, json) = toggle(&state, "42", "1", " 👍 ").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["counts"], json!({ "👍": 1 }));
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn test_toggle_with_failed_store_is_500_and_not_broadcast() {
    let store = ReactionStore::dragonfly("redis://localhost:6379")
        .await
        .unwrap();
    store.close().await.unwrap();
    let state = Arc::new(AppState::new(ReactionService::new(
        store,
        Arc::new(EmojiPolicy::default()),
    )));
    let mut rx = state.subscribe();

    let (status, json) = toggle(&state, "42", "1", "👍").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], 500);
    assert!(json["error"].as_str().unwrap().starts_with("store error"));
    assert!(rx.try_recv().is_err());
}
