//! Music playback capability.
//!
//! Handlers depend on the [`Playback`] trait; [`SpotifyPlayback`] implements
//! it against the Spotify Web API using a pre-issued user access token.
//! Obtaining or refreshing that token is out of scope here.

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use songpin_core::{Song, TrackRef};

use crate::config::SpotifyConfig;

/// Errors that can occur when talking to the playback provider.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A free-text song matched no track.
    #[error("no track found for '{0}'")]
    TrackNotFound(String),

    /// Client misconfiguration (bad base URL or token).
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Something that can start playback of a track.
pub trait Playback: Send + Sync {
    /// Start playing `track` on the user's active (or configured) device.
    fn play_track_by_reference<'a>(
        &'a self,
        track: &'a TrackRef,
    ) -> BoxFuture<'a, Result<(), PlaybackError>>;

    /// Find the best matching track for free text.
    fn search_track<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Option<TrackRef>, PlaybackError>>;
}

/// Play a pin's song: directly when it is a track reference, otherwise via
/// the provider's search.
///
/// # Errors
///
/// Returns [`PlaybackError::TrackNotFound`] when a free-text song matches
/// nothing, or whatever the provider reports.
pub async fn play_song(playback: &dyn Playback, song: &Song) -> Result<TrackRef, PlaybackError> {
    let track = match song.track_ref() {
        Some(track) => track,
        None => playback
            .search_track(song.as_str())
            .await?
            .ok_or_else(|| PlaybackError::TrackNotFound(song.to_string()))?,
    };
    playback.play_track_by_reference(&track).await?;
    Ok(track)
}

/// Spotify Web API playback client.
#[derive(Clone)]
pub struct SpotifyPlayback {
    client: reqwest::Client,
    api_base: Url,
    device_id: Option<String>,
}

impl SpotifyPlayback {
    /// Create a new Spotify client.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client fails to
    /// build.
    pub fn new(config: &SpotifyConfig) -> Result<Self, PlaybackError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.access_token.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| PlaybackError::Config(format!("invalid access token format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: parse_api_base(&config.api_base)?,
            device_id: config.device_id.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PlaybackError> {
        self.api_base
            .join(path)
            .map_err(|e| PlaybackError::Config(format!("invalid endpoint {path}: {e}")))
    }

    async fn error_from(response: reqwest::Response) -> PlaybackError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        PlaybackError::Api { status, message }
    }
}

impl Playback for SpotifyPlayback {
    fn play_track_by_reference<'a>(
        &'a self,
        track: &'a TrackRef,
    ) -> BoxFuture<'a, Result<(), PlaybackError>> {
        async move {
            let mut url = self.endpoint("me/player/play")?;
            if let Some(device_id) = &self.device_id {
                url.query_pairs_mut().append_pair("device_id", device_id);
            }

            let body = serde_json::json!({ "uris": [track.uri()] });
            let response = self.client.put(url).json(&body).send().await?;
            if !response.status().is_success() {
                return Err(Self::error_from(response).await);
            }

            tracing::info!(track = %track, "Playback started");
            Ok(())
        }
        .boxed()
    }

    fn search_track<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Option<TrackRef>, PlaybackError>> {
        async move {
            let mut url = self.endpoint("search")?;
            url.query_pairs_mut()
                .append_pair("q", query)
                .append_pair("type", "track")
                .append_pair("limit", "1");

            let response = self.client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(Self::error_from(response).await);
            }

            let results: SearchResponse = response
                .json()
                .await
                .map_err(|e| PlaybackError::Parse(e.to_string()))?;

            results
                .tracks
                .items
                .into_iter()
                .next()
                .map(|item| {
                    TrackRef::parse(&item.id).map_err(|e| PlaybackError::Parse(e.to_string()))
                })
                .transpose()
        }
        .boxed()
    }
}

/// Parse the API base, making sure relative joins append to its path.
fn parse_api_base(raw: &str) -> Result<Url, PlaybackError> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).map_err(|e| PlaybackError::Config(format!("invalid API base {raw}: {e}")))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
}
