//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! songpin migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SONGPIN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/api/migrations/` and are embedded at build time.

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let store = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(store.pool()).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
