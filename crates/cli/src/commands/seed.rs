//! Seed the database with demo users and pins.
//!
//! Inserts two users and one pin each, in New York and Los Angeles, which is
//! enough to exercise owner listings and a proximity search that includes
//! one pin and excludes the other.

use tracing::info;

use songpin_api::db::PinStore;
use songpin_core::{GeoPoint, Pin, Song, User, UserId};

use super::{CliError, connect};

struct SeedUser {
    id: &'static str,
    name: &'static str,
}

struct SeedPin {
    song: &'static str,
    owner: &'static str,
    latitude: f64,
    longitude: f64,
}

const USERS: &[SeedUser] = &[
    SeedUser {
        id: "12345",
        name: "Alice",
    },
    SeedUser {
        id: "67890",
        name: "Bob",
    },
];

const PINS: &[SeedPin] = &[
    SeedPin {
        song: "Shape of You",
        owner: "12345",
        latitude: 40.7128,
        longitude: -74.006,
    },
    SeedPin {
        song: "Blinding Lights",
        owner: "67890",
        latitude: 34.0522,
        longitude: -118.2437,
    },
];

fn invalid(what: &'static str, err: impl std::fmt::Display) -> CliError {
    CliError::Invalid(what, err.to_string())
}

/// Seed demo data.
///
/// # Arguments
///
/// * `keep_existing` - If false, delete all pins and users first
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run(keep_existing: bool) -> Result<(), CliError> {
    let store = connect().await?;

    if keep_existing {
        info!("Keeping existing data");
    } else {
        store.clear().await?;
        info!("Cleared existing pins and users");
    }

    for seed in USERS {
        let id = UserId::parse(seed.id).map_err(|e| invalid("user id", e))?;
        let user = User::new(id, seed.name).map_err(|e| invalid("display name", e))?;
        let user = store.create_user(user).await?;
        info!("  User {} ({})", user.id, user.display_name);
    }

    for seed in PINS {
        let song = Song::parse(seed.song).map_err(|e| invalid("song", e))?;
        let owner = UserId::parse(seed.owner).map_err(|e| invalid("user id", e))?;
        let coordinate =
            GeoPoint::new(seed.latitude, seed.longitude).map_err(|e| invalid("coordinate", e))?;
        let pin = store.create_pin(Pin::new(song, owner, coordinate)).await?;
        info!("  Pin '{}' at {} ({})", pin.song, pin.coordinate, pin.id);
    }

    info!(
        "Seeding complete! {} users, {} pins",
        USERS.len(),
        PINS.len()
    );
    Ok(())
}
