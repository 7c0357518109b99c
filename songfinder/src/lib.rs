//! # songfinder
//!
//! A song catalog keyed by title, stored in an [`rb_index::RbTree`], with a CSV
//! bulk loader and a text menu front end.
//!
//! ## Architecture
//!
//! 1. **Loader** ([`reader`]): parses `artist, title, duration` rows into [`Song`]s.
//! 2. **Catalog** ([`catalog`]): inserts songs into the index and answers
//!    title queries, formatting durations for display.
//! 3. **Console** ([`console`]): menu loop that turns catalog failures into
//!    user-facing messages.
//!
//! ## Example
//!
//! ```rust
//! use songfinder::{Catalog, FinderConfig};
//!
//! let mut catalog = Catalog::from_config(&FinderConfig::default());
//! catalog.add_one_song("Africa", "295000", "Toto").unwrap();
//!
//! assert_eq!(catalog.find_song_by_title("Africa").unwrap(), "Toto, 4:55");
//! assert_eq!(catalog.song_count(), 1);
//! ```

#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod console;
pub mod error;
pub mod reader;
pub mod song;

pub use catalog::{format_duration, Catalog, LoadReport};
pub use config::{DuplicatePolicy, FinderConfig};
pub use console::Console;
pub use error::{FinderError, Result};
pub use reader::{CsvSongReader, SongReader};
pub use song::Song;
