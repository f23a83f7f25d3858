//! Builds `components.json` from a directory of `.txt` component sources.
//!
//! Each file becomes one component: the file stem is its alias, a
//! title-cased stem is its name, and the content is turned into markup by
//! file-name convention (address, email, phone, hours, image directive,
//! otherwise a paragraph). `keywords:` lines are lifted out of the content.

use crate::catalog::{Alias, ComponentBundle, ComponentEntry, ComponentName};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pins seeded when a visitor has no URL or stored state.
pub const DEFAULT_PINNED: [&str; 4] = ["Hours of Operation", "Address", "Email", "Phone"];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// One parsed source file before markup generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentSource {
    pub file_name: String,
    pub stem: String,
    pub content: String,
    pub keywords: Option<String>,
}

impl ComponentSource {
    /// Split a file's text into content and an optional `keywords:` line.
    ///
    /// When several keyword lines exist the last one wins.
    pub fn parse(file_name: &str, text: &str) -> Self {
        let mut keywords = None;
        let mut content_lines = Vec::new();
        for line in text.split_inclusive('\n') {
            let trimmed = line.trim();
            if trimmed.to_lowercase().starts_with("keywords:") {
                let value = trimmed.split_once(':').map(|(_, v)| v.trim()).unwrap_or("");
                keywords = Some(value.to_string());
            } else {
                content_lines.push(line);
            }
        }
        Self {
            file_name: file_name.to_string(),
            stem: file_name
                .strip_suffix(".txt")
                .unwrap_or(file_name)
                .to_string(),
            content: content_lines.concat().trim().to_string(),
            keywords,
        }
    }

    pub fn component_name(&self) -> ComponentName {
        ComponentName(component_name_for_stem(&self.stem))
    }

    pub fn alias(&self) -> Alias {
        Alias(self.stem.clone())
    }

    pub fn to_entry(&self) -> ComponentEntry {
        ComponentEntry {
            content: content_markup(&self.content, &self.file_name),
            keywords: Some(self.keywords.clone().unwrap_or_default()),
        }
    }
}

/// Display name for a file stem, including the few hand-picked renames.
pub fn component_name_for_stem(stem: &str) -> String {
    let spaced = stem.replace(['_', '-'], " ");
    let name = title_case(&spaced);
    match name.as_str() {
        "Contact" => "Contact Us".to_string(),
        "Joke" => "Random Joke".to_string(),
        "Hours" => "Hours of Operation".to_string(),
        _ => name,
    }
}

/// Upper-case the first letter of each run of letters, lower-case the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_cased = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if previous_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_cased = true;
        } else {
            out.push(c);
            previous_cased = false;
        }
    }
    out
}

/// Markup for a component's content, chosen by file name and directives.
pub fn content_markup(content: &str, file_name: &str) -> String {
    if let Some(markup) = image_markup(content, file_name) {
        return markup;
    }

    match file_name {
        "address.txt" => format!(
            r#"<div class="content"><a href="https://maps.google.com/?q={content}">{content}</a></div>"#
        ),
        "email.txt" => {
            format!(r#"<div class="content"><a href="mailto:{content}">{content}</a></div>"#)
        }
        "phone.txt" => {
            let digits: String = content.chars().filter(char::is_ascii_digit).collect();
            format!(r#"<div class="content"><a href="tel:{digits}">{content}</a></div>"#)
        }
        "hours.txt" => hours_markup(content),
        _ => format!("<p>{content}</p>"),
    }
}

fn image_markup(content: &str, file_name: &str) -> Option<String> {
    let mut lines = content.split('\n');
    let first = lines.next()?;
    if !first.to_lowercase().starts_with("image:") {
        return None;
    }
    let image_path = first.split_once(':').map(|(_, p)| p.trim()).unwrap_or("");
    let caption = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    let alt_text = if caption.is_empty() {
        title_case(&file_name.replace(".txt", "").replace('_', " "))
    } else {
        caption.clone()
    };

    let mut html = format!(
        r#"<img src="{image_path}" alt="{alt_text}" style="width:100%; height:auto; border-radius: 4px;">"#
    );
    if !caption.is_empty() {
        html.push_str(&format!(
            r#"<p style="text-align: center; font-style: italic; margin-top: 0.5rem; font-size: 0.9em;">{caption}</p>"#
        ));
    }
    Some(format!(r#"<div class="content">{html}</div>"#))
}

fn hours_markup(content: &str) -> String {
    let mut rows = String::new();
    let mut notes = String::new();
    for line in content.lines() {
        let Some((day, hours)) = line.split_once(':') else {
            continue;
        };
        let hours = hours.trim();
        if WEEKDAYS.contains(&day.trim().to_lowercase().as_str()) {
            rows.push_str(&format!("<tr><td>{}</td><td>{hours}</td></tr>", day.trim()));
        } else {
            notes.push_str(&format!(r#"<div class="hours-note">{day}: {hours}</div>"#));
        }
    }
    format!(
        r#"<div class="content"><table class="hours-table"><thead><tr><th>Day</th><th>Hours</th></tr></thead><tbody>{rows}</tbody></table>{notes}</div>"#
    )
}

/// Every `.txt` file directly under `dir`, sorted by file name.
pub fn collect_component_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("reading components dir {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Assemble a bundle from parsed sources.
///
/// Two files that title-case to the same name are rejected rather than
/// letting one silently replace the other.
pub fn build_bundle(
    sources: &[ComponentSource],
    default_pinned: &[String],
) -> Result<ComponentBundle> {
    let mut bundle = ComponentBundle::default();
    for source in sources {
        let name = source.component_name();
        if bundle.components.contains_key(&name) {
            bail!(
                "component name {name} produced by more than one file (latest: {})",
                source.file_name
            );
        }
        debug!(component = %name, file = %source.file_name, "adding component");
        bundle.components.push(name.clone(), source.to_entry());
        bundle.aliases.push(name, source.alias());
    }
    bundle.default_pinned = default_pinned
        .iter()
        .map(|name| ComponentName(name.clone()))
        .collect();
    Ok(bundle)
}

/// Read every component file under `dir` and build the bundle.
pub fn generate_bundle(dir: &Path, default_pinned: &[String]) -> Result<ComponentBundle> {
    let mut sources = Vec::new();
    for path in collect_component_files(dir)? {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("non UTF-8 file name {}", path.display()))?
            .to_string();
        let text =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        sources.push(ComponentSource::parse(&file_name, &text));
    }
    let bundle = build_bundle(&sources, default_pinned)?;
    info!(
        components = bundle.components.len(),
        dir = %dir.display(),
        "generated component bundle"
    );
    Ok(bundle)
}

pub fn default_pinned_names() -> Vec<String> {
    DEFAULT_PINNED.iter().map(|name| name.to_string()).collect()
}
