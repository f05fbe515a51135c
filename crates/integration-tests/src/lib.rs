//! Integration tests for SongPin.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory router tests
//! cargo test -p songpin-integration-tests
//!
//! # Including the PostgreSQL store tests
//! SONGPIN_TEST_DATABASE_URL=postgres://localhost/songpin_test \
//!     cargo test -p songpin-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `pins` - Pin creation, listing, proximity and deletion over HTTP
//! - `users` - User registration and deletion rules
//! - `health` - Liveness, readiness and request id handling
//! - `playback` - Play endpoint against a local fake of the Spotify Web API
//! - `postgres_store` - `PgStore` against a real database

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use songpin_api::state::AppState;

/// A router over a fresh in-memory store with no playback configured.
#[must_use]
pub fn test_app() -> Router {
    songpin_api::app(AppState::in_memory())
}

/// Build a request with an optional JSON body.
#[must_use]
pub fn request(method: Method, uri: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request through the router and decode the response body.
///
/// Empty bodies decode to [`Value::Null`]; non-JSON bodies to a string.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

/// `GET uri`
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, request(Method::GET, uri, None)).await
}

/// `POST uri` with a JSON body.
pub async fn post(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(app, request(Method::POST, uri, Some(body))).await
}

/// `DELETE uri`
pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, request(Method::DELETE, uri, None)).await
}

/// Register a user, asserting success.
pub async fn register_user(app: &Router, id: &str, name: &str) {
    let (status, body) = post(
        app,
        "/api/users",
        &serde_json::json!({ "id": id, "display_name": name }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
}

/// Create a pin, asserting success, and return its JSON.
pub async fn create_pin(app: &Router, song: &str, owner: &str, lat: f64, lng: f64) -> Value {
    let (status, body) = post(
        app,
        "/api/pins",
        &serde_json::json!({
            "song": song,
            "owner_id": owner,
            "coordinate": { "lat": lat, "lng": lng },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create pin failed: {body}");
    body
}
