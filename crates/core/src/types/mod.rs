//! Core types for SongPin.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod pin;
pub mod song;
pub mod track;

pub use id::{PinId, UserId, UserIdError};
pub use pin::{DisplayNameError, NearbyPin, Pin, User};
pub use song::{Song, SongError};
pub use track::{TrackRef, TrackRefError};
