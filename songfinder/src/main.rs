//! Song Finder
//!
//! Interactive song lookup over a title-keyed red-black tree index.

use anyhow::Context;
use clap::Parser;
use songfinder::{Catalog, Console, FinderConfig};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "songfinder")]
#[command(about = "Look up songs by title from a CSV playlist")]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// CSV playlist to load before the menu starts
    #[arg(short = 'd', long)]
    data: Option<PathBuf>,

    /// CSV field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "songfinder=info")
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FinderConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FinderConfig::default(),
    };
    if let Some(data) = args.data {
        config.data_file = Some(data);
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(level) = args.log_level {
        config.log_filter = level;
    }
    config.validate()?;

    // Logs go to stderr; stdout belongs to the menu.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting Song Finder");

    let mut catalog = Catalog::from_config(&config);
    if let Some(path) = &config.data_file {
        info!("Preloading playlist {:?}", path);
        catalog
            .load_data(path)
            .with_context(|| format!("failed to load playlist {}", path.display()))?;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), catalog);
    console.run()?;

    info!("Song Finder stopped");
    Ok(())
}
