//! SongPin CLI - Database migrations, seeding and user management.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! songpin migrate
//!
//! # Reset and load demo users and pins
//! songpin seed
//!
//! # Load demo data without clearing existing rows
//! songpin seed --keep
//!
//! # Register a user
//! songpin user create --id 12345 --name "Alice"
//!
//! # List users
//! songpin user list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "songpin")]
#[command(author, version, about = "SongPin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo users and pins
    Seed {
        /// Keep existing rows instead of clearing them first
        #[arg(long)]
        keep: bool,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Create {
        /// User id
        #[arg(short, long)]
        id: String,

        /// Display name
        #[arg(short, long)]
        name: String,
    },
    /// List all users
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { keep } => commands::seed::run(keep).await?,
        Commands::User { action } => match action {
            UserAction::Create { id, name } => {
                commands::user::create(&id, &name).await?;
            }
            UserAction::List => commands::user::list().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_keep() {
        let cli = Cli::try_parse_from(["songpin", "seed", "--keep"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed { keep: true })
        ));
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from(["songpin", "user", "create", "-i", "12345", "-n", "Alice"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::Create { .. }
            })
        ));
    }

    #[test]
    fn test_parse_user_create_with_named_id() {
        let cli = Cli::try_parse_from([
            "songpin", "user", "create", "--id", "alice.w_01", "--name", "Alice",
        ]);
        let Ok(Commands::User {
            action: UserAction::Create { id, .. },
        }) = cli.map(|c| c.command)
        else {
            panic!("expected user create");
        };
        assert_eq!(id, "alice.w_01");
        assert!(songpin_core::UserId::parse(&id).is_ok());
    }
}
