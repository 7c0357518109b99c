//! Text menu over a [`Catalog`].
//!
//! Generic over its input and output so sessions can be scripted in tests.

use crate::catalog::Catalog;
use crate::error::FinderError;
use crate::reader::{CsvSongReader, SongReader};
use std::io::{self, BufRead, Write};
use tracing::debug;

const BANNER: &str = "================================================";

const MENU: &str = "Pick a command from the list below!
    [L]oads playlist from file
    Add Songs [+]
    Search Song [D]uration
    Search Song [A]rtist
    Search Song [I]nformation
    List [S]ongs by first letter
    [R]emove Song
    Display Search [H]istory
    [Q]uit
";

const ADD_PROMPT: &str =
    "Add your song in this format [title/duration/artist], press [Q] to exit:";

pub struct Console<I, O, R = CsvSongReader> {
    input: I,
    output: O,
    catalog: Catalog<R>,
    history: Vec<String>,
}

impl<I: BufRead, O: Write, R: SongReader> Console<I, O, R> {
    pub fn new(input: I, output: O, catalog: Catalog<R>) -> Self {
        Self {
            input,
            output,
            catalog,
            history: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog<R> {
        &self.catalog
    }

    /// Songs looked up so far, as `"title by artist, duration"`, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Runs the menu until `Q` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "{BANNER}")?;
        writeln!(self.output, "Welcome to the Music Finder App!")?;
        writeln!(self.output, "{BANNER}")?;

        loop {
            let Some(command) = self.read_command()? else {
                break;
            };
            debug!("Command {:?}", command);
            match command {
                'L' => self.load_data_command()?,
                '+' => self.add_song_command()?,
                'D' => self.duration_command()?,
                'A' => self.artist_command()?,
                'I' | 'T' => self.info_command()?,
                'S' => self.browse_command()?,
                'R' => self.remove_command()?,
                'H' => self.history_command()?,
                'Q' => break,
                _ => writeln!(
                    self.output,
                    "Unrecognizable command. Pick a command by selecting one of the letters within []s."
                )?,
            }
        }

        writeln!(self.output, "Thanks for using Music Finder!")?;
        self.output.flush()
    }

    /// Next trimmed input line, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.read_line()
    }

    /// Upper-cased first character of the reply; `'\0'` for a blank line.
    fn read_command(&mut self) -> io::Result<Option<char>> {
        writeln!(self.output, "{MENU}")?;
        let Some(line) = self.prompt("Enter command: ")? else {
            return Ok(None);
        };
        Ok(Some(
            line.chars()
                .next()
                .map_or('\0', |c| c.to_ascii_uppercase()),
        ))
    }

    /// Asks until a non-empty title is given.
    fn read_title(&mut self) -> io::Result<Option<String>> {
        loop {
            match self.prompt("Enter the song title: ")? {
                None => return Ok(None),
                Some(title) if title.is_empty() => {
                    writeln!(self.output, "Title can't be empty. Try again.")?;
                }
                Some(title) => return Ok(Some(title)),
            }
        }
    }

    fn load_data_command(&mut self) -> io::Result<()> {
        let Some(file) = self.prompt("Enter the name of the file to load: ")? else {
            return Ok(());
        };
        match self.catalog.load_data(&file) {
            Ok(report) => writeln!(
                self.output,
                "{file} loaded successfully! ({} added, {} skipped)",
                report.inserted, report.skipped
            ),
            Err(FinderError::Io(e)) => {
                debug!("Load of {} failed: {}", file, e);
                writeln!(self.output, "Error: Could not find or load file {file}")
            }
            Err(e) => writeln!(self.output, "Error: Could not load file {file}: {e}"),
        }
    }

    fn add_song_command(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{ADD_PROMPT}")?;
            let Some(mut input) = self.read_line()? else {
                return Ok(());
            };
            if input.starts_with('[') && input.ends_with(']') && input.len() >= 2 {
                input = input[1..input.len() - 1].trim().to_string();
            }
            if input.eq_ignore_ascii_case("q") {
                return Ok(());
            }

            let details: Vec<&str> = input.split('/').collect();
            if details.len() != 3 {
                writeln!(self.output, "Invalid data/format entered! Try again.")?;
                continue;
            }

            match self
                .catalog
                .add_one_song(details[0], details[1], details[2])
            {
                Ok(()) => return writeln!(self.output, "Song successfully added!"),
                Err(FinderError::InvalidDuration(_)) => writeln!(
                    self.output,
                    "Ensure duration entered is either in ms or min:sec format"
                )?,
                Err(FinderError::InvalidInput(_)) => writeln!(
                    self.output,
                    "Missing data! Make sure the song is in this format [title/duration/artist].\nTry again."
                )?,
                Err(FinderError::DuplicateSong(_)) => {
                    writeln!(self.output, "Song already exists! Try again.")?
                }
                Err(e) => return writeln!(self.output, "Error: {e}"),
            }
        }
    }

    fn duration_command(&mut self) -> io::Result<()> {
        let Some(title) = self.read_title()? else {
            return Ok(());
        };
        match self.catalog.duration_by_title(&title) {
            Ok(duration) => {
                self.remember(&title);
                writeln!(self.output, "Duration of {title}: {duration}")
            }
            Err(e) => self.report_lookup_failure(&e),
        }
    }

    fn artist_command(&mut self) -> io::Result<()> {
        let Some(title) = self.read_title()? else {
            return Ok(());
        };
        match self.catalog.artist_by_title(&title).map(str::to_string) {
            Ok(artist) => {
                self.remember(&title);
                writeln!(self.output, "Artist of {title}: {artist}")
            }
            Err(e) => self.report_lookup_failure(&e),
        }
    }

    fn info_command(&mut self) -> io::Result<()> {
        let Some(title) = self.read_title()? else {
            return Ok(());
        };
        match self.catalog.find_song_by_title(&title) {
            Ok(stats) => {
                self.remember(&title);
                writeln!(self.output, "{title}\n{stats}")
            }
            Err(e) => self.report_lookup_failure(&e),
        }
    }

    fn browse_command(&mut self) -> io::Result<()> {
        let Some(initial) = self.prompt("Enter the first letter: ")? else {
            return Ok(());
        };
        let listing = match self.catalog.songs_starting_with(&initial) {
            Ok(songs) => songs.iter().map(ToString::to_string).collect::<Vec<_>>(),
            Err(e) => return self.report_lookup_failure(&e),
        };
        if listing.is_empty() {
            return writeln!(self.output, "No songs start with '{initial}'.");
        }
        for (i, song) in listing.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, song)?;
        }
        Ok(())
    }

    fn remove_command(&mut self) -> io::Result<()> {
        let Some(title) = self.read_title()? else {
            return Ok(());
        };
        match self.catalog.remove_song(&title) {
            Ok(song) => writeln!(self.output, "Removed {song}"),
            Err(e) => self.report_lookup_failure(&e),
        }
    }

    fn history_command(&mut self) -> io::Result<()> {
        if self.history.is_empty() {
            return writeln!(self.output, "Search history is empty.");
        }
        writeln!(
            self.output,
            "Total songs in playlist: {}\nTotal searched songs: {}",
            self.catalog.song_count(),
            self.history.len()
        )?;
        for (i, entry) in self.history.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, entry)?;
        }
        Ok(())
    }

    fn remember(&mut self, title: &str) {
        let Ok(details) = self.catalog.find_song_by_title(title) else {
            return;
        };
        let entry = format!("{title} by {details}");
        if !self.history.contains(&entry) {
            self.history.push(entry);
        }
    }

    fn report_lookup_failure(&mut self, err: &FinderError) -> io::Result<()> {
        debug!("Lookup failed: {}", err);
        if err.is_missing_song() {
            writeln!(self.output, "Song title doesn't exist.")
        } else {
            writeln!(self.output, "Error: {err}")
        }
    }
}
