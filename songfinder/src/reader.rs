//! CSV playlist loading.
//!
//! Rows are `artist, title, duration`. Fields may be wrapped in double quotes, in
//! which case the delimiter is literal inside them and `""` stands for one quote.

use crate::config::FinderConfig;
use crate::error::{FinderError, Result};
use crate::song::Song;
use smallvec::SmallVec;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Source of songs for a bulk load.
pub trait SongReader {
    fn read_songs(&self, path: &Path) -> Result<Vec<Song>>;
}

/// Reads delimited text with an optional header line.
#[derive(Debug, Clone)]
pub struct CsvSongReader {
    delimiter: char,
    has_header: bool,
}

type Fields = SmallVec<[String; 4]>;

impl CsvSongReader {
    pub fn new(delimiter: char, has_header: bool) -> Self {
        Self {
            delimiter,
            has_header,
        }
    }

    pub fn from_config(config: &FinderConfig) -> Self {
        Self::new(config.delimiter, config.has_header)
    }

    /// Parses every row of `input`. Blank lines are skipped; any malformed row
    /// fails the whole parse with its 1-based line number.
    pub fn parse<R: BufRead>(&self, input: R) -> Result<Vec<Song>> {
        let mut songs = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            if (idx == 0 && self.has_header) || line.trim().is_empty() {
                continue;
            }

            let fields = split_fields(&line, self.delimiter).map_err(|reason| {
                FinderError::Parse {
                    line: line_no,
                    reason: reason.to_string(),
                }
            })?;
            if fields.len() < 3 {
                return Err(FinderError::Parse {
                    line: line_no,
                    reason: format!("expected 3 fields, found {}", fields.len()),
                });
            }
            if fields[1].is_empty() {
                return Err(FinderError::Parse {
                    line: line_no,
                    reason: "empty title".to_string(),
                });
            }

            let mut fields = fields.into_iter();
            let artist = fields.next().unwrap_or_default();
            let title = fields.next().unwrap_or_default();
            let duration = fields.next().unwrap_or_default();
            songs.push(Song::new(title, artist, duration));
        }
        Ok(songs)
    }
}

impl SongReader for CsvSongReader {
    fn read_songs(&self, path: &Path) -> Result<Vec<Song>> {
        debug!("Reading songs from {}", path.display());
        let file = File::open(path)?;
        self.parse(BufReader::new(file))
    }
}

/// Splits one row. Unquoted fields are trimmed; quoted fields keep their inner
/// whitespace.
fn split_fields(line: &str, delimiter: char) -> std::result::Result<Fields, &'static str> {
    let mut fields = Fields::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && !quoted && field.trim().is_empty() {
            field.clear();
            quoted = true;
            in_quotes = true;
        } else if c == delimiter {
            fields.push(finish_field(&mut field, quoted));
            quoted = false;
        } else if !(quoted && c.is_whitespace()) {
            field.push(c);
        }
    }

    if in_quotes {
        return Err("unterminated quoted field");
    }
    fields.push(finish_field(&mut field, quoted));
    Ok(fields)
}

fn finish_field(field: &mut String, quoted: bool) -> String {
    let value = std::mem::take(field);
    if quoted {
        value
    } else {
        value.trim().to_string()
    }
}
