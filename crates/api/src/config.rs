//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SONGPIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; not needed with `SONGPIN_STORAGE=memory`)
//!
//! ## Optional
//! - `SONGPIN_STORAGE` - `postgres` (default) or `memory`
//! - `SONGPIN_HOST` - Bind address (default: 127.0.0.1)
//! - `SONGPIN_PORT` - Listen port (default: 5173)
//! - `SONGPIN_CORS_ORIGINS` - Comma-separated allowed origins (default: any)
//! - `SONGPIN_LOG_FORMAT` - `text` (default) or `json`
//! - `SPOTIFY_ACCESS_TOKEN` - Enables playback (validated, high entropy)
//! - `SPOTIFY_DEVICE_ID` - Device to start playback on
//! - `SPOTIFY_API_BASE` - Web API base URL (default: <https://api.spotify.com/v1>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - default 1.0

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where pins and users are kept.
#[derive(Clone)]
pub enum StorageConfig {
    Postgres { database_url: SecretString },
    Memory,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[REDACTED]")
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub storage: StorageConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    /// Playback integration, when configured
    pub spotify: Option<SpotifyConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Spotify Web API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct SpotifyConfig {
    pub access_token: SecretString,
    pub device_id: Option<String>,
    pub api_base: String,
}

impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("access_token", &"[REDACTED]")
            .field("device_id", &self.device_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the playback token fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage = match parse_storage(&get_env_or_default("SONGPIN_STORAGE", "postgres"))? {
            StorageKind::Postgres => StorageConfig::Postgres {
                database_url: get_database_url("SONGPIN_DATABASE_URL")?,
            },
            StorageKind::Memory => StorageConfig::Memory,
        };
        let host = get_env_or_default("SONGPIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SONGPIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SONGPIN_PORT", "5173")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SONGPIN_PORT".to_string(), e.to_string()))?;
        let cors_origins = get_optional_env("SONGPIN_CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();
        let log_format = parse_log_format(&get_env_or_default("SONGPIN_LOG_FORMAT", "text"))?;

        let spotify = SpotifyConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            storage,
            host,
            port,
            cors_origins,
            log_format,
            spotify,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// A configuration for local runs and tests: in-memory storage, no
    /// playback, no error tracking.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 5173,
            cors_origins: Vec::new(),
            log_format: LogFormat::Text,
            spotify: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SpotifyConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(token) = get_optional_env("SPOTIFY_ACCESS_TOKEN") else {
            return Ok(None);
        };
        validate_secret_strength(&token, "SPOTIFY_ACCESS_TOKEN")?;
        Ok(Some(Self {
            access_token: SecretString::from(token),
            device_id: get_optional_env("SPOTIFY_DEVICE_ID"),
            api_base: get_env_or_default("SPOTIFY_API_BASE", DEFAULT_SPOTIFY_API_BASE),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageKind {
    Postgres,
    Memory,
}

fn parse_storage(value: &str) -> Result<StorageKind, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(StorageKind::Postgres),
        "memory" => Ok(StorageKind::Memory),
        other => Err(ConfigError::InvalidEnvVar(
            "SONGPIN_STORAGE".to_string(),
            format!("expected 'postgres' or 'memory', got '{other}'"),
        )),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "text" | "" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(ConfigError::InvalidEnvVar(
            "SONGPIN_LOG_FORMAT".to_string(),
            format!("expected 'text' or 'json', got '{other}'"),
        )),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Paste the real token."
            ),
        ));
    }

    Ok(())
}
