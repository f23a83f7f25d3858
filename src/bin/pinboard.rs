//! Drives one page session of the pin/search controller from the command line.
//!
//! Boots against a bundle, a page URL, and an optional storage file, replays
//! `--toggle` clicks and a `--search` value in order, then prints either a
//! JSON report of the resulting page state or the region markup.

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use pinboard::controller::Element;
use pinboard::{
    Affordance, BundleSource, Controller, FetchedBundle, FileSource, FileStorage, Location,
    MemoryLocation, MemoryStorage, PinStorage, Phase, STORAGE_ENV, StaticSource, UiEffect,
    init_tracing, locate_bundle,
};
use serde::Serialize;
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pinboard", about = "Resolve, toggle, and render pinned components")]
struct Cli {
    /// Bundle path (defaults to $PINBOARD_BUNDLE or the nearest components.json)
    #[arg(long)]
    bundle: Option<PathBuf>,

    /// Page URL, including any `pinned=` query
    #[arg(long, default_value = "http://localhost/index.html")]
    url: String,

    /// JSON file standing in for local storage (defaults to $PINBOARD_STORAGE)
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Component to click pin/unpin on; repeatable, applied in order
    #[arg(long = "toggle", value_name = "NAME")]
    toggles: Vec<String>,

    /// Search box value to apply after the toggles
    #[arg(long)]
    search: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Html,
}

#[derive(Serialize)]
struct Report<'a> {
    phase: Phase,
    url: &'a str,
    pinned: Vec<&'a str>,
    search: &'a str,
    pinned_html: &'a str,
    search_html: &'a str,
    effects: Vec<UiEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
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
    let location = MemoryLocation::parse(&cli.url)?;
    let storage_path = cli
        .storage
        .clone()
        .or_else(|| env::var_os(STORAGE_ENV).map(PathBuf::from));

    match storage_path {
        Some(path) => session(&cli, location, FileStorage::new(path)),
        None => session(&cli, location, MemoryStorage::default()),
    }
}

fn session<S: PinStorage>(cli: &Cli, location: MemoryLocation, storage: S) -> Result<()> {
    let cwd = env::current_dir()?;
    let source: Box<dyn BundleSource> = match locate_bundle(cli.bundle.as_deref(), &cwd) {
        Ok(path) => Box::new(FileSource::new(path)),
        // A missing bundle is a failed fetch, reported through the page state.
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "bundle not found");
            Box::new(StaticSource::new(FetchedBundle {
                status: 404,
                body: String::new(),
            }))
        }
    };

    let mut controller = Controller::new(location, storage);
    let mut effects = controller.start(&*source);

    if controller.phase() == Phase::Ready {
        for name in &cli.toggles {
            let affordance = Affordance::for_pinned(controller.pinned().contains(name));
            effects.extend(controller.on_click(&[Element::button(affordance, name)]));
        }
        if let Some(query) = &cli.search {
            effects.extend(controller.on_search_input(query));
        }
    } else if !cli.toggles.is_empty() || cli.search.is_some() {
        tracing::warn!("controller failed to load; ignoring toggles and search");
    }

    match cli.format {
        OutputFormat::Json => {
            let report = Report {
                phase: controller.phase(),
                url: controller.location().current().as_str(),
                pinned: controller.pinned().iter().map(|n| n.as_str()).collect(),
                search: &controller.search_box().value,
                pinned_html: &controller.view().pinned,
                search_html: &controller.view().search,
                effects,
                body: controller.body_override(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Html => {
            if let Some(body) = controller.body_override() {
                println!("{body}");
            } else {
                println!(
                    "<div id=\"starter-components\">{}</div>\n<div id=\"related-components\">{}</div>",
                    controller.view().pinned,
                    controller.view().search
                );
            }
        }
    }

    if controller.phase() == Phase::Failed {
        bail!("could not load page components");
    }
    Ok(())
}
