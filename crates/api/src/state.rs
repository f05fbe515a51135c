//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{ApiConfig, StorageConfig};
use crate::db::{self, MemoryStore, PgStore, PinStore};
use crate::services::playback::{Playback, PlaybackError, SpotifyPlayback};

/// Error building application state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("playback client error: {0}")]
    Playback(#[from] PlaybackError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store, the optional playback client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Arc<dyn PinStore>,
    playback: Option<Arc<dyn Playback>>,
}

impl AppState {
    /// Create application state from already-built parts.
    #[must_use]
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn PinStore>,
        playback: Option<Arc<dyn Playback>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                playback,
            }),
        }
    }

    /// Build the store and playback client described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or the playback
    /// client cannot be built.
    pub async fn from_config(config: ApiConfig) -> Result<Self, StateError> {
        let store: Arc<dyn PinStore> = match &config.storage {
            StorageConfig::Postgres { database_url } => {
                let pool = db::create_pool(database_url).await?;
                tracing::info!("Database pool created");
                Arc::new(PgStore::new(pool))
            }
            StorageConfig::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let playback: Option<Arc<dyn Playback>> = match &config.spotify {
            Some(spotify) => {
                tracing::info!("Spotify playback enabled");
                Some(Arc::new(SpotifyPlayback::new(spotify)?))
            }
            None => None,
        };

        Ok(Self::new(config, store, playback))
    }

    /// State over a fresh in-memory store with no playback.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(ApiConfig::in_memory(), Arc::new(MemoryStore::new()), None)
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get the pin store.
    #[must_use]
    pub fn store(&self) -> &dyn PinStore {
        self.inner.store.as_ref()
    }

    /// Get the playback client, if configured.
    #[must_use]
    pub fn playback(&self) -> Option<&dyn Playback> {
        self.inner.playback.as_deref()
    }
}
