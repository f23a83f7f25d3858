//! Where the component bundle comes from.
//!
//! The controller fetches once at startup. A source answers with a status
//! code and body so HTTP-like failures (non-2xx) and transport failures
//! (`Err`) collapse into the same terminal state.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// Raw response for the bundle request.
#[derive(Clone, Debug)]
pub struct FetchedBundle {
    pub status: u16,
    pub body: String,
}

impl FetchedBundle {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a successful response; errors on any non-2xx status.
    pub fn into_body(self) -> Result<String> {
        if !self.is_success() {
            bail!("HTTP error! status: {}", self.status);
        }
        Ok(self.body)
    }
}

pub trait BundleSource {
    fn fetch(&self) -> Result<FetchedBundle>;
}

/// Bundle read from a file; a read failure counts as a transport error.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BundleSource for FileSource {
    fn fetch(&self) -> Result<FetchedBundle> {
        let body = fs::read_to_string(&self.path)
            .with_context(|| format!("fetching bundle {}", self.path.display()))?;
        Ok(FetchedBundle::ok(body))
    }
}

/// Fixed response, for tests and embedded bundles.
#[derive(Clone, Debug)]
pub struct StaticSource {
    response: FetchedBundle,
}

impl StaticSource {
    pub fn new(response: FetchedBundle) -> Self {
        Self { response }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(FetchedBundle::ok(body))
    }
}

impl BundleSource for StaticSource {
    fn fetch(&self) -> Result<FetchedBundle> {
        Ok(self.response.clone())
    }
}
