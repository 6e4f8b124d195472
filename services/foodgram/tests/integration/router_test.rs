use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::Value;

use foodgram::handlers::short_link::short_link_url;
use foodgram::router::build_router;
use foodgram::state::AppState;

use crate::helpers::TEST_JWT_SECRET;

/// Router over a disconnected database: only paths that fail before any
/// query can be exercised.
fn state() -> AppState {
    AppState {
        db: DatabaseConnection::Disconnected,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        token_ttl_secs: 60,
        public_base_url: "http://testserver".to_owned(),
        media_root: std::env::temp_dir().join("foodgram-router-test-media"),
    }
}

fn server() -> TestServer {
    TestServer::new(build_router(state())).unwrap()
}

#[tokio::test]
async fn should_answer_liveness_probe_with_request_id() {
    let response = server().get("/healthz").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let response = server().get("/readyz").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_require_token_for_current_user() {
    let response = server().get("/api/users/me/").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_reject_malformed_token_on_public_route() {
    let response = server()
        .get("/api/recipes/")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Token definitely-not-a-jwt"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_TOKEN");
}

#[tokio::test]
async fn should_reject_unknown_filter_flag() {
    let response = server().get("/api/recipes/?is_favorited=maybe").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION_FAILED");
    assert!(body["fields"]["is_favorited"].is_array());
}

#[tokio::test]
async fn should_require_token_for_writes() {
    let server = server();

    let create = server
        .post("/api/recipes/")
        .json(&serde_json::json!({"name": "x"}))
        .await;
    assert_eq!(create.status_code(), StatusCode::UNAUTHORIZED);

    let favorite = server.post("/api/recipes/1/favorite/").await;
    assert_eq!(favorite.status_code(), StatusCode::UNAUTHORIZED);

    let cart = server.get("/api/recipes/download_shopping_cart/").await;
    assert_eq!(cart.status_code(), StatusCode::UNAUTHORIZED);

    let subscribe = server.post("/api/users/2/subscribe/").await;
    assert_eq!(subscribe.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_route_issued_short_link_to_redirect_handler() {
    let url = short_link_url(&state(), "Ab3dE9");
    assert_eq!(url, "http://testserver/s/Ab3dE9/");
    let path = url.strip_prefix("http://testserver").unwrap();

    // Handler reached: its lookup fails on the disconnected database.
    let response = server().get(path).await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INTERNAL");
}

#[tokio::test]
async fn should_route_short_link_without_trailing_slash() {
    let response = server().get("/s/Ab3dE9").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INTERNAL");
}
