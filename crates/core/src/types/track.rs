//! Playable track references.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TrackRef`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackRefError {
    /// The input is not a track URI, track URL, or bare track id.
    #[error("not a track reference: {0}")]
    Unrecognized(String),
}

/// A reference to a single track in the music catalog.
///
/// Accepted forms:
///
/// - `spotify:track:<id>`
/// - `https://open.spotify.com/track/<id>` (query string and trailing slash ignored)
/// - a bare 22-character base62 `<id>`
///
/// ```rust
/// use songpin_core::TrackRef;
///
/// let a = TrackRef::parse("spotify:track:7qiZfU4dY1lWllzX7mPBI3").unwrap();
/// let b = TrackRef::parse("https://open.spotify.com/track/7qiZfU4dY1lWllzX7mPBI3?si=abc").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.uri(), "spotify:track:7qiZfU4dY1lWllzX7mPBI3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRef(String);

impl TrackRef {
    /// Length of a catalog track id.
    pub const ID_LENGTH: usize = 22;

    const URI_PREFIX: &'static str = "spotify:track:";
    const URL_PREFIXES: &'static [&'static str] = &[
        "https://open.spotify.com/track/",
        "http://open.spotify.com/track/",
        "open.spotify.com/track/",
    ];

    /// Parse a track reference.
    ///
    /// # Errors
    ///
    /// Returns [`TrackRefError::Unrecognized`] if the input matches none of the
    /// accepted forms.
    pub fn parse(s: &str) -> Result<Self, TrackRefError> {
        let s = s.trim();

        let candidate = if let Some(rest) = s.strip_prefix(Self::URI_PREFIX) {
            rest
        } else if let Some(rest) = Self::URL_PREFIXES
            .iter()
            .find_map(|prefix| s.strip_prefix(prefix))
        {
            rest.split(['?', '#']).next().unwrap_or("").trim_end_matches('/')
        } else {
            s
        };

        if is_track_id(candidate) {
            Ok(Self(candidate.to_owned()))
        } else {
            Err(TrackRefError::Unrecognized(s.to_owned()))
        }
    }

    /// The bare track id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }

    /// The `spotify:track:<id>` URI form.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{}{}", Self::URI_PREFIX, self.0)
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::URI_PREFIX, self.0)
    }
}

fn is_track_id(s: &str) -> bool {
    s.len() == TrackRef::ID_LENGTH && s.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ID: &str = "7qiZfU4dY1lWllzX7mPBI3";

    #[test]
    fn test_parse_uri() {
        let track = TrackRef::parse(&format!("spotify:track:{ID}")).unwrap();
        assert_eq!(track.id(), ID);
    }

    #[test]
    fn test_parse_url_with_query_and_slash() {
        let track =
            TrackRef::parse(&format!("https://open.spotify.com/track/{ID}/?si=1f2e")).unwrap();
        assert_eq!(track.id(), ID);
    }

    #[test]
    fn test_parse_bare_id() {
        let track = TrackRef::parse(ID).unwrap();
        assert_eq!(track.uri(), format!("spotify:track:{ID}"));
        assert_eq!(track.to_string(), track.uri());
    }

    #[test]
    fn test_rejects_titles_and_other_kinds() {
        assert!(TrackRef::parse("Shape of You").is_err());
        assert!(TrackRef::parse(&format!("spotify:album:{ID}")).is_err());
        assert!(TrackRef::parse("spotify:track:short").is_err());
    }
}
