//! Clients for external services.

pub mod playback;

pub use playback::{Playback, PlaybackError, SpotifyPlayback, play_song};
