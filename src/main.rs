//! `xsli` - dump SLI segments from a Nintendo 64 ROM.
//!
//! ```text
//! xsli [-d] [-g] [-o] [-v] [--out-dir DIR] ROM
//! ```
//!
//! Segments are written next to the ROM unless `--out-dir` is given.
//! `RUST_LOG` overrides the log filter; `-v` raises the default to
//! `debug`, which reports every rejected tag.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slikit::{Extractor, Naming, Rom, scan_and_extract};

/// SLI Extractor [Nintendo 64]
#[derive(Parser)]
#[command(name = "xsli")]
#[command(about = "Dump MIO0/Yay0/Yaz0/SMSR00 segments from a Nintendo 64 ROM")]
#[command(version)]
struct Cli {
    /// Decode SLI data into new files
    #[arg(short = 'd', long)]
    decode: bool,

    /// Use the internal game name for files
    #[arg(short = 'g', long)]
    game_name: bool,

    /// Write the big-endian ROM
    #[arg(short = 'o', long)]
    write_rom: bool,

    /// Enable verbose messages
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Directory for extracted files (defaults to the ROM's directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// ROM file to scan
    rom: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let started = Instant::now();

    let rom =
        Rom::open(&cli.rom).with_context(|| format!("unable to open {}", cli.rom.display()))?;

    let mut game_name = cli.game_name;
    let mut write_rom = cli.write_rom;
    if !rom.is_recognized() {
        if game_name {
            info!("not an N64 ROM, game naming disabled");
            game_name = false;
        }
        if write_rom {
            info!("not an N64 ROM, big-endian ROM output disabled");
            write_rom = false;
        }
    }

    if write_rom && rom.was_reordered() {
        rom.write_normalized(&cli.rom).context("unable to write big-endian ROM")?;
    }

    let identity = if game_name { rom.header() } else { None };
    let out_dir = cli
        .out_dir
        .clone()
        .unwrap_or_else(|| cli.rom.parent().map(PathBuf::from).unwrap_or_default());
    let extractor = Extractor::new(out_dir)
        .decode(cli.decode)
        .naming(identity.as_ref().map(Naming::game).unwrap_or_default());

    let summary = scan_and_extract(rom.data(), identity.as_ref(), &extractor);

    println!("# Hits: {}", summary.hits);
    println!("# Oddities: {}", summary.oddities);
    if summary.failures > 0 {
        println!("# Failures: {}", summary.failures);
    }
    println!("# {} seconds elapsed.", started.elapsed().as_secs());
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
