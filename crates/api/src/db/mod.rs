//! Pin and user storage.
//!
//! Handlers talk to a [`PinStore`]; two backends implement it:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx, the production backend
//! - [`MemoryStore`] - process-local, for tests and quick local runs
//!
//! Both evaluate proximity queries with the same haversine metric and return
//! ties in insertion order.
//!
//! ## Tables
//!
//! - `users` - registered users (text id, display name)
//! - `pins` - songs dropped at a `[lng, lat]` coordinate
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p songpin-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use futures::future::BoxFuture;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use songpin_core::{NearbyPin, Pin, PinId, ProximityQuery, User, UserId};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A pin referenced a user that does not exist.
    #[error("owner {0} does not exist")]
    OwnerNotFound(UserId),

    /// Constraint violation (e.g., duplicate user id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage for users and their pins.
///
/// Every write either fully succeeds or leaves the store unchanged.
pub trait PinStore: Send + Sync {
    /// Cheap connectivity check used by the readiness probe.
    fn ping(&self) -> BoxFuture<'_, Result<(), RepositoryError>>;

    /// Register a user.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the id is taken.
    fn create_user(&self, user: User) -> BoxFuture<'_, Result<User, RepositoryError>>;

    fn get_user<'a>(&'a self, id: &'a UserId)
    -> BoxFuture<'a, Result<Option<User>, RepositoryError>>;

    /// All users in registration order.
    fn list_users(&self) -> BoxFuture<'_, Result<Vec<User>, RepositoryError>>;

    /// Remove a user.
    ///
    /// Fails with [`RepositoryError::NotFound`] for an unknown id and
    /// [`RepositoryError::Conflict`] while any pin still references the user.
    fn delete_user<'a>(&'a self, id: &'a UserId) -> BoxFuture<'a, Result<(), RepositoryError>>;

    /// Store a pin.
    ///
    /// Fails with [`RepositoryError::OwnerNotFound`], persisting nothing, when
    /// the owner is not registered.
    fn create_pin(&self, pin: Pin) -> BoxFuture<'_, Result<Pin, RepositoryError>>;

    fn get_pin(&self, id: PinId) -> BoxFuture<'_, Result<Option<Pin>, RepositoryError>>;

    /// Pins dropped by `owner`, in insertion order.
    fn pins_by_owner<'a>(
        &'a self,
        owner: &'a UserId,
    ) -> BoxFuture<'a, Result<Vec<Pin>, RepositoryError>>;

    /// Pins within the query radius, nearest first, ties in insertion order.
    fn nearby_pins(
        &self,
        query: ProximityQuery,
    ) -> BoxFuture<'_, Result<Vec<NearbyPin>, RepositoryError>>;

    /// Remove a pin. Returns whether a pin was removed.
    fn delete_pin(&self, id: PinId) -> BoxFuture<'_, Result<bool, RepositoryError>>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
