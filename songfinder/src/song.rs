//! The catalog record.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

/// A song, identified and ordered by its title.
///
/// `artist` and `duration` are carried along and play no part in comparisons, so
/// two songs with the same title are the same catalog entry.
#[derive(Debug, Clone)]
pub struct Song {
    title: String,
    artist: String,
    duration: String,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            duration: duration.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Raw duration as loaded: milliseconds or `min:sec`.
    pub fn duration(&self) -> &str {
        &self.duration
    }
}

impl PartialEq for Song {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Eq for Song {}

impl PartialOrd for Song {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Song {
    fn cmp(&self, other: &Self) -> Ordering {
        self.title.cmp(&other.title)
    }
}

/// Lets the index be searched by title alone.
impl Borrow<str> for Song {
    fn borrow(&self) -> &str {
        &self.title
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}, ({})", self.title, self.artist, self.duration)
    }
}
