//! URL and storage surfaces plus the synchronizer that writes both.
//!
//! `Location` stands in for the page's address bar and history; `PinStorage`
//! for its key/value local storage. The in-memory implementations back tests
//! and one-shot renders; `FileStorage` keeps state across CLI invocations.

use crate::catalog::ComponentIndex;
use crate::pinned::{PIN_PARAM, PinnedSet, STORAGE_KEY, encode_pinned_query, serialize_stored};
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use url::Url;

/// Key/value persistent storage, shaped like the browser's local storage.
pub trait PinStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Current page address plus replace-only history access.
pub trait Location {
    fn current(&self) -> &Url;
    /// Swap the current entry's URL and state without growing history.
    fn replace_state(&mut self, state: Value, url: Url);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}

impl PinStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }
}

/// Storage persisted as a flat JSON object of string values.
///
/// A missing file reads as empty storage. Writes go through a temp file in
/// the same directory and are renamed into place.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading storage {}", self.path.display()))?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&data)
            .with_context(|| format!("parsing storage {}", self.path.display()))?
        {
            Value::Object(map) => Ok(map),
            _ => bail!("storage {} must hold a JSON object", self.path.display()),
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut tmp, map)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path)
            .with_context(|| format!("writing storage {}", self.path.display()))?;
        Ok(())
    }
}

impl PinStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let map = self.read_all()?;
        Ok(map.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&map)
    }
}

/// In-memory address bar that records replace-state calls.
#[derive(Clone, Debug)]
pub struct MemoryLocation {
    url: Url,
    state: Option<Value>,
    history_len: usize,
}

impl MemoryLocation {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            state: None,
            history_len: 1,
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).with_context(|| format!("invalid page URL {raw}"))?;
        Ok(Self::new(url))
    }

    /// State object attached by the last replace-state call.
    pub fn state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }
}

impl Location for MemoryLocation {
    fn current(&self) -> &Url {
        &self.url
    }

    fn replace_state(&mut self, state: Value, url: Url) {
        self.state = Some(state);
        self.url = url;
    }
}

/// Page URL with its query replaced by `pinned=<encoded>`.
///
/// `encoded` must already be query-escaped (see `encode_pinned_query`).
/// Other parameters and the fragment are dropped; the path is kept.
pub fn pinned_url(current: &Url, encoded: &str) -> Url {
    let mut next = current.clone();
    next.set_query(Some(&format!("{PIN_PARAM}={encoded}")));
    next.set_fragment(None);
    next
}

/// Rewrite the address bar for the current pinned set.
pub fn write_url<L>(location: &mut L, pinned: &PinnedSet, index: &ComponentIndex)
where
    L: Location + ?Sized,
{
    let encoded = encode_pinned_query(pinned, index);
    let next = pinned_url(location.current(), &encoded);
    let state_names: Vec<&str> = if encoded.is_empty() {
        Vec::new()
    } else {
        pinned.iter().map(|name| name.as_str()).collect()
    };
    debug!(url = %next, "replacing page URL");
    location.replace_state(json!({ PIN_PARAM: state_names }), next);
}

/// Store the full pinned set under `pinnedComponents`.
pub fn write_storage<S>(storage: &mut S, pinned: &PinnedSet) -> Result<()>
where
    S: PinStorage + ?Sized,
{
    let serialized = serialize_stored(pinned)?;
    storage.set_item(STORAGE_KEY, &serialized)
}

/// Persist after a mutation: storage first, then the URL.
///
/// A storage failure is logged and does not stop the URL rewrite.
pub fn persist<L, S>(
    location: &mut L,
    storage: &mut S,
    pinned: &PinnedSet,
    index: &ComponentIndex,
) where
    L: Location + ?Sized,
    S: PinStorage + ?Sized,
{
    if let Err(err) = write_storage(storage, pinned) {
        warn!(error = %format!("{err:#}"), "unable to persist pinned components");
    }
    write_url(location, pinned, index);
}
