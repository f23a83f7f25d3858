#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use pinboard::{Controller, MemoryLocation, MemoryStorage, StaticSource};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const ALPHA_BETA_BUNDLE: &str = r#"{
    "components": {
        "Alpha": {"content": "<p>A</p>"},
        "Beta": {"content": "<p>B</p>"}
    },
    "aliases": {"Alpha": "a", "Beta": "b"},
    "defaultPinned": ["Alpha"]
}"#;

pub type MemoryController = Controller<MemoryLocation, MemoryStorage>;

/// Boot a controller against an in-memory page and storage.
pub fn boot(bundle: &str, url: &str, storage: MemoryStorage) -> MemoryController {
    let location = MemoryLocation::parse(url).expect("test URL must parse");
    let mut controller = Controller::new(location, storage);
    controller.start(&StaticSource::ok(bundle));
    controller
}

pub fn write_bundle(dir: &Path, bundle: &str) -> PathBuf {
    let path = dir.join("components.json");
    fs::write(&path, bundle).expect("write bundle fixture");
    path
}

pub fn write_component(dir: &Path, file_name: &str, text: &str) {
    fs::write(dir.join(file_name), text).expect("write component fixture");
}

pub fn bin(name: &str) -> PathBuf {
    match name {
        "pinboard" => PathBuf::from(env!("CARGO_BIN_EXE_pinboard")),
        "build-components" => PathBuf::from(env!("CARGO_BIN_EXE_build-components")),
        other => panic!("unknown binary {other}"),
    }
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}
