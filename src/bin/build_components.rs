//! Generates `components.json` from a directory of `.txt` component files.
//!
//! The output is checked by loading it back through `ComponentIndex` before
//! anything is written, so a bundle this tool produces always boots the page.

use anyhow::{Context, Result};
use clap::Parser;
use pinboard::generator::{default_pinned_names, generate_bundle};
use pinboard::{BUNDLE_FILE, ComponentIndex, init_tracing, split_list};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "build-components", about = "Build components.json from text sources")]
struct Cli {
    /// Directory holding the `.txt` component sources
    #[arg(long, default_value = "components")]
    dir: PathBuf,

    /// Output path; `-` writes to stdout
    #[arg(long, default_value = BUNDLE_FILE)]
    out: PathBuf,

    /// Comma-separated default pins (overrides the built-in list)
    #[arg(long)]
    default_pinned: Option<String>,
}

fn main() {
    init_tracing().ok();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let default_pinned = cli
        .default_pinned
        .as_deref()
        .map(split_list)
        .unwrap_or_else(default_pinned_names);

    let bundle = generate_bundle(&cli.dir, &default_pinned)?;
    let json = bundle.to_pretty_json()?;
    ComponentIndex::from_json(&json).context("generated bundle failed validation")?;

    if cli.out.as_os_str() == "-" {
        println!("{json}");
        return Ok(());
    }

    fs::write(&cli.out, format!("{json}\n"))
        .with_context(|| format!("writing {}", cli.out.display()))?;
    info!(path = %cli.out.display(), "wrote component bundle");
    eprintln!("Successfully generated {}", cli.out.display());
    Ok(())
}
