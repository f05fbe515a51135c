//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! songpin user create --id 12345 --name "Alice"
//! songpin user list
//! ```

use songpin_api::db::PinStore;
use songpin_core::{User, UserId};

use super::{CliError, connect};

/// Register a new user.
///
/// # Errors
///
/// Returns an error if the id or name is invalid, the id is taken, or the
/// database is unreachable.
pub async fn create(id: &str, name: &str) -> Result<User, CliError> {
    let id = UserId::parse(id).map_err(|e| CliError::Invalid("user id", e.to_string()))?;
    let user = User::new(id, name).map_err(|e| CliError::Invalid("display name", e.to_string()))?;

    let store = connect().await?;
    let user = store.create_user(user).await?;

    tracing::info!("User created: {} ({})", user.id, user.display_name);
    Ok(user)
}

/// Print every user in registration order.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), CliError> {
    let store = connect().await?;
    let users = store.list_users().await?;

    #[allow(clippy::print_stdout)]
    {
        for user in &users {
            println!(
                "{}\t{}\t{}",
                user.id,
                user.display_name,
                user.created_at.to_rfc3339()
            );
        }
    }

    tracing::info!("{} users", users.len());
    Ok(())
}
