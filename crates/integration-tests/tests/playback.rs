//! Play endpoint against a local fake of the Spotify Web API.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get as get_route, put},
};
use secrecy::SecretString;
use serde_json::{Value, json};

use songpin_api::{
    config::{ApiConfig, SpotifyConfig},
    db::MemoryStore,
    services::SpotifyPlayback,
    state::AppState,
};
use songpin_integration_tests::{create_pin, post, register_user, test_app};

const TRACK_ID: &str = "7qiZfU4dY1lWllzX7mPBI3";

#[derive(Clone, Default)]
struct FakeSpotify {
    played: Arc<Mutex<Vec<Value>>>,
    searches: Arc<Mutex<Vec<String>>>,
    search_hits: bool,
    play_status: Option<StatusCode>,
}

async fn fake_play(
    State(fake): State<FakeSpotify>,
    Json(body): Json<Value>,
) -> StatusCode {
    fake.played.lock().unwrap().push(body);
    fake.play_status.unwrap_or(StatusCode::NO_CONTENT)
}

async fn fake_search(
    State(fake): State<FakeSpotify>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Json<Value> {
    fake.searches
        .lock()
        .unwrap()
        .push(params.get("q").cloned().unwrap_or_default());
    let items = if fake.search_hits {
        json!([{ "id": TRACK_ID, "name": "Blinding Lights" }])
    } else {
        json!([])
    };
    Json(json!({ "tracks": { "items": items } }))
}

/// Start the fake API on an ephemeral port and build an app that talks to it.
async fn app_with_fake(fake: FakeSpotify) -> Router {
    let router = Router::new()
        .route("/v1/me/player/play", put(fake_play))
        .route("/v1/search", get_route(fake_search))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let playback = SpotifyPlayback::new(&SpotifyConfig {
        access_token: SecretString::from("test-token"),
        device_id: None,
        api_base: format!("http://{addr}/v1"),
    })
    .unwrap();

    songpin_api::app(AppState::new(
        ApiConfig::in_memory(),
        Arc::new(MemoryStore::new()),
        Some(Arc::new(playback)),
    ))
}

async fn play(app: &Router, pin: &Value) -> (StatusCode, Value) {
    let uri = format!("/api/pins/{}/play", pin["id"].as_str().unwrap());
    post(app, &uri, &json!({})).await
}

#[tokio::test]
async fn test_play_unconfigured_is_503() {
    let app = test_app();
    register_user(&app, "12345", "Alice").await;
    let pin = create_pin(&app, "Shape of You", "12345", 0.0, 0.0).await;

    let (status, body) = play(&app, &pin).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_play_track_reference_skips_search() {
    let fake = FakeSpotify::default();
    let app = app_with_fake(fake.clone()).await;
    register_user(&app, "12345", "Alice").await;
    let pin = create_pin(
        &app,
        &format!("https://open.spotify.com/track/{TRACK_ID}?si=abc"),
        "12345",
        0.0,
        0.0,
    )
    .await;

    let (status, _) = play(&app, &pin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(fake.searches.lock().unwrap().is_empty());
    assert_eq!(
        fake.played.lock().unwrap().as_slice(),
        [json!({ "uris": [format!("spotify:track:{TRACK_ID}")] })]
    );
}

#[tokio::test]
async fn test_play_title_searches_first() {
    let fake = FakeSpotify {
        search_hits: true,
        ..FakeSpotify::default()
    };
    let app = app_with_fake(fake.clone()).await;
    register_user(&app, "12345", "Alice").await;
    let pin = create_pin(&app, "Blinding Lights", "12345", 0.0, 0.0).await;

    let (status, _) = play(&app, &pin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(fake.searches.lock().unwrap().as_slice(), ["Blinding Lights"]);
    assert_eq!(fake.played.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_play_title_without_match_is_404() {
    let fake = FakeSpotify::default();
    let app = app_with_fake(fake.clone()).await;
    register_user(&app, "12345", "Alice").await;
    let pin = create_pin(&app, "No Such Song", "12345", 0.0, 0.0).await;

    let (status, body) = play(&app, &pin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No matching track found");
    assert!(fake.played.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_play_upstream_failure_is_502() {
    let fake = FakeSpotify {
        play_status: Some(StatusCode::FORBIDDEN),
        ..FakeSpotify::default()
    };
    let app = app_with_fake(fake).await;
    register_user(&app, "12345", "Alice").await;
    let pin = create_pin(&app, &format!("spotify:track:{TRACK_ID}"), "12345", 0.0, 0.0).await;

    let (status, body) = play(&app, &pin).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Playback service error");
}

#[tokio::test]
async fn test_play_unknown_pin_is_404() {
    let app = app_with_fake(FakeSpotify::default()).await;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = post(&app, &format!("/api/pins/{missing}/play"), &json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Pin not found");
}
