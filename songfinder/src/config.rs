//! Configuration for the song finder.

use crate::error::{FinderError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What a bulk load does when a title is already in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Log and count the duplicate, keep loading.
    #[default]
    Skip,
    /// Fail the whole load before anything is inserted.
    Reject,
}

/// Song finder configuration, usually read from a TOML file.
///
/// Every field has a default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// CSV playlist loaded at startup.
    pub data_file: Option<PathBuf>,
    /// Field delimiter for CSV input.
    pub delimiter: char,
    /// Whether the first CSV line is a header to skip.
    pub has_header: bool,
    /// Duplicate handling during bulk loads.
    pub on_duplicate: DuplicatePolicy,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            delimiter: ',',
            has_header: true,
            on_duplicate: DuplicatePolicy::Skip,
            log_filter: "warn".to_string(),
        }
    }
}

impl FinderConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(FinderError::InvalidInput(format!(
                "{:?} cannot be used as a field delimiter",
                self.delimiter
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FinderConfig::default();
        assert_eq!(config.delimiter, ',');
        assert!(config.has_header);
        assert_eq!(config.on_duplicate, DuplicatePolicy::Skip);
        assert_eq!(config.data_file, None);
    }

    #[test]
    fn test_partial_file() {
        let config = FinderConfig::from_toml_str(
            r#"
            delimiter = ";"
            on_duplicate = "reject"
            "#,
        )
        .unwrap();
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.on_duplicate, DuplicatePolicy::Reject);
        assert!(config.has_header);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_full_file() {
        let config = FinderConfig::from_toml_str(
            r#"
            data_file = "songs.csv"
            delimiter = "|"
            has_header = false
            on_duplicate = "skip"
            log_filter = "songfinder=debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_file, Some(PathBuf::from("songs.csv")));
        assert!(!config.has_header);
        assert_eq!(config.log_filter, "songfinder=debug");
    }

    #[test]
    fn test_rejects_quote_delimiter() {
        let err = FinderConfig::from_toml_str(r#"delimiter = '"'"#).unwrap_err();
        assert!(matches!(err, FinderError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let err = FinderConfig::from_toml_str(r#"on_duplicate = "merge""#).unwrap_err();
        assert!(matches!(err, FinderError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finder.toml");
        fs::write(&path, "has_header = false\n").unwrap();
        let config = FinderConfig::load(&path).unwrap();
        assert!(!config.has_header);

        let missing = FinderConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, FinderError::Io(_)));
    }
}
