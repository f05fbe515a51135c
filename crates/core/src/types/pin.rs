//! Pin and user domain types.
//!
//! These are the validated domain objects shared by every store backend; the
//! database row types live next to the queries that produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{PinId, UserId};
use super::song::Song;
use crate::geo::{GeoPoint, StoredCoordinate};

/// A geotagged song dropped by a user.
///
/// Immutable after creation; the only state change is deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Unique pin ID.
    pub id: PinId,
    /// Song name or track reference.
    pub song: Song,
    /// The user who dropped the pin (lookup key, not ownership).
    pub owner_id: UserId,
    /// Where the pin was dropped.
    pub coordinate: GeoPoint,
    /// When the pin was created.
    pub created_at: DateTime<Utc>,
}

impl Pin {
    /// Create a new pin with a fresh ID, timestamped now.
    #[must_use]
    pub fn new(song: Song, owner_id: UserId, coordinate: GeoPoint) -> Self {
        Self {
            id: PinId::generate(),
            song,
            owner_id,
            coordinate,
            created_at: Utc::now(),
        }
    }

    /// The coordinate in persisted `[lng, lat]` order.
    #[must_use]
    pub const fn location(&self) -> StoredCoordinate {
        self.coordinate.to_stored()
    }
}

/// A pin returned by a proximity query, with its distance from the query center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPin {
    #[serde(flatten)]
    pub pin: Pin,
    /// Great-circle distance from the query center, in meters.
    pub distance_m: f64,
}

/// Errors that can occur when validating a display name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("display name cannot be empty")]
    Empty,
    #[error("display name must be at most {max} characters")]
    TooLong { max: usize },
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Maximum display name length, in characters.
    pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

    /// Create a user, trimming and validating the display name.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayNameError`] if the trimmed name is empty or too long.
    pub fn new(id: UserId, display_name: &str) -> Result<Self, DisplayNameError> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(DisplayNameError::Empty);
        }
        if name.chars().count() > Self::MAX_DISPLAY_NAME_LENGTH {
            return Err(DisplayNameError::TooLong {
                max: Self::MAX_DISPLAY_NAME_LENGTH,
            });
        }
        Ok(Self {
            id,
            display_name: name.to_owned(),
            created_at: Utc::now(),
        })
    }
}
