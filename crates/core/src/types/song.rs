//! Song descriptor attached to a pin.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::track::TrackRef;

/// Errors that can occur when parsing a [`Song`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SongError {
    /// The input is empty or only whitespace.
    #[error("song cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("song must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A song name or track reference, as entered by the pin's creator.
///
/// Leading and trailing whitespace is trimmed. The value is either a free-text
/// title ("Shape of You") or something [`TrackRef::parse`] accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Song(String);

impl Song {
    /// Maximum length of a song descriptor, in characters.
    pub const MAX_LENGTH: usize = 300;

    /// Parse a `Song` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Song::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, SongError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SongError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(SongError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the song as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The playable track reference, if the song is one rather than a title.
    #[must_use]
    pub fn track_ref(&self) -> Option<TrackRef> {
        TrackRef::parse(&self.0).ok()
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Song {
    type Error = SongError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Song> for String {
    fn from(song: Song) -> Self {
        song.0
    }
}
