//! Error types for the song catalog.

use rb_index::IndexError;
use thiserror::Error;

/// Result type alias using FinderError.
pub type Result<T> = std::result::Result<T, FinderError>;

/// Errors that can occur while loading, querying or editing the catalog.
#[derive(Debug, Error)]
pub enum FinderError {
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid duration '{0}': expected milliseconds or min:sec")]
    InvalidDuration(String),

    #[error("song already exists: {0}")]
    DuplicateSong(String),
}

impl FinderError {
    /// True for failures that mean "no such song" to a user: a missing title,
    /// an empty catalog, or an unusable query.
    pub fn is_missing_song(&self) -> bool {
        matches!(
            self,
            FinderError::Index(
                IndexError::NotFound | IndexError::EmptyContainer | IndexError::InvalidArgument(_)
            ) | FinderError::InvalidInput(_)
        )
    }
}
