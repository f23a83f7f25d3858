//! Shared library for the pinboard component page.
//!
//! The crate holds the pin/search controller and everything it touches: the
//! component bundle and its alias tables, the pinned-set encodings for the
//! URL and local storage, the card renderer, and the generator that builds
//! `components.json` from plain-text sources. Browser surfaces are traits
//! (`Location`, `PinStorage`, `BundleSource`) so the binaries and tests drive
//! the same controller the page does.

use anyhow::{Result, anyhow, bail};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub mod catalog;
pub mod controller;
pub mod generator;
pub mod pinned;
pub mod render;
mod schema_loader;
pub mod source;
pub mod sync;

pub use catalog::{
    Affordance, Alias, ComponentBundle, ComponentEntry, ComponentIndex, ComponentName,
};
pub use controller::{Controller, Element, Phase, SearchBox, UiEffect, find_affordance};
pub use pinned::{
    PIN_PARAM, PinSource, PinnedSet, STORAGE_KEY, decode_pinned_param, encode_pinned_param,
    encode_pinned_query, resolve_initial,
};
pub use render::{MIN_QUERY_LENGTH, RenderedView, ScrollLatch, render};
pub use source::{BundleSource, FetchedBundle, FileSource, StaticSource};
pub use sync::{FileStorage, Location, MemoryLocation, MemoryStorage, PinStorage};

/// File name the page fetches relative to itself.
pub const BUNDLE_FILE: &str = "components.json";
/// Environment override for the bundle path.
pub const BUNDLE_ENV: &str = "PINBOARD_BUNDLE";
/// Environment override for the storage file used by the CLI.
pub const STORAGE_ENV: &str = "PINBOARD_STORAGE";

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = start.canonicalize().ok()?;
    loop {
        let candidate = dir.join(BUNDLE_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the component bundle.
///
/// Search order: an explicit path, then `PINBOARD_BUNDLE`, then the nearest
/// `components.json` at or above `start`.
pub fn locate_bundle(explicit: Option<&Path>, start: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        bail!("Bundle not found: {}", path.display());
    }

    if let Ok(env_path) = env::var(BUNDLE_ENV) {
        let trimmed = env_path.trim();
        if !trimmed.is_empty() {
            let path = PathBuf::from(trimmed);
            if path.is_file() {
                return Ok(path);
            }
            bail!("{BUNDLE_ENV} points at a missing file: {}", path.display());
        }
    }

    if let Some(found) = search_upwards(start) {
        return Ok(found);
    }

    bail!(
        "Unable to locate {BUNDLE_FILE} from {}. Pass --bundle or set {BUNDLE_ENV}.",
        start.display()
    )
}

/// Split comma-delimited configuration lists into trimmed tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Install the stderr fmt subscriber, honoring `RUST_LOG` (default `info`).
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
