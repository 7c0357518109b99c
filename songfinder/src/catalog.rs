//! Song catalog: title-keyed queries over the red-black index.

use crate::config::{DuplicatePolicy, FinderConfig};
use crate::error::{FinderError, Result};
use crate::reader::{CsvSongReader, SongReader};
use crate::song::Song;
use rb_index::{IndexError, RbTree};
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of a bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Songs indexed by title.
pub struct Catalog<R = CsvSongReader> {
    songs: RbTree<Song>,
    reader: R,
    on_duplicate: DuplicatePolicy,
}

impl Catalog<CsvSongReader> {
    pub fn from_config(config: &FinderConfig) -> Self {
        Self::new(CsvSongReader::from_config(config), config.on_duplicate)
    }
}

impl<R: SongReader> Catalog<R> {
    pub fn new(reader: R, on_duplicate: DuplicatePolicy) -> Self {
        Self {
            songs: RbTree::new(),
            reader,
            on_duplicate,
        }
    }

    pub fn load_data(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        let songs = self.reader.read_songs(path)?;
        let report = self.add_songs(songs)?;
        info!(
            "Loaded {} songs from {} ({} duplicates skipped)",
            report.inserted,
            path.display(),
            report.skipped
        );
        Ok(report)
    }

    /// Inserts a batch of songs under the configured duplicate policy.
    ///
    /// With [`DuplicatePolicy::Reject`] the batch is checked up front, so a
    /// rejected batch inserts nothing.
    pub fn add_songs(&mut self, songs: Vec<Song>) -> Result<LoadReport> {
        if self.on_duplicate == DuplicatePolicy::Reject {
            let mut seen: RbTree<&str> = RbTree::new();
            for song in &songs {
                if self.songs.contains(song.title()) || seen.insert(song.title()).is_err() {
                    return Err(FinderError::DuplicateSong(song.title().to_string()));
                }
            }
        }

        let mut report = LoadReport::default();
        for song in songs {
            let title = song.title().to_string();
            match self.songs.insert(song) {
                Ok(()) => report.inserted += 1,
                Err(IndexError::DuplicateKey) => {
                    warn!("Skipping duplicate song '{}'", title);
                    report.skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(report)
    }

    pub fn add_one_song(&mut self, title: &str, duration: &str, artist: &str) -> Result<()> {
        let (title, duration, artist) = (title.trim(), duration.trim(), artist.trim());
        if title.is_empty() || duration.is_empty() || artist.is_empty() {
            return Err(FinderError::InvalidInput(
                "title, duration and artist are all required".to_string(),
            ));
        }
        if !duration.chars().all(|c| c.is_ascii_digit() || c == ':') {
            return Err(FinderError::InvalidDuration(duration.to_string()));
        }

        match self.songs.insert(Song::new(title, artist, duration)) {
            Ok(()) => {
                debug!("Added song '{}'", title);
                Ok(())
            }
            Err(IndexError::DuplicateKey) => Err(FinderError::DuplicateSong(title.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub fn remove_song(&mut self, title: &str) -> Result<Song> {
        let title = checked_title(title)?;
        let song = self.songs.remove(title)?;
        debug!("Removed song '{}'", title);
        Ok(song)
    }

    pub fn song(&self, title: &str) -> Result<&Song> {
        Ok(self.songs.get(checked_title(title)?)?)
    }

    /// `"artist, duration"` for the song titled `title`.
    pub fn find_song_by_title(&self, title: &str) -> Result<String> {
        let song = self.song(title)?;
        Ok(format!("{}, {}", song.artist(), format_duration(song.duration())))
    }

    pub fn artist_by_title(&self, title: &str) -> Result<&str> {
        Ok(self.song(title)?.artist())
    }

    pub fn duration_by_title(&self, title: &str) -> Result<String> {
        Ok(format_duration(self.song(title)?.duration()))
    }

    /// Songs whose title starts with the same letter as `initial`, ignoring case.
    pub fn songs_starting_with(&self, initial: &str) -> Result<Vec<&Song>> {
        Ok(self.songs.prefix_search(initial.trim())?)
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn songs(&self) -> &RbTree<Song> {
        &self.songs
    }
}

fn checked_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FinderError::InvalidInput("title must not be empty".to_string()));
    }
    Ok(title)
}

/// Renders a stored duration for display.
///
/// Purely numeric values are milliseconds and become `minutes:seconds` with
/// two-digit seconds. Anything else (already `min:sec`, or unparseable) is
/// returned as is.
pub fn format_duration(raw: &str) -> String {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.to_string();
    }
    match raw.parse::<u64>() {
        Ok(millis) => {
            let total_secs = millis / 1000;
            format!("{}:{:02}", total_secs / 60, total_secs % 60)
        }
        Err(_) => raw.to_string(),
    }
}
