//! The pin/search controller: one owned struct per page session.
//!
//! Lifecycle is `Loading → Ready` or `Loading → Failed`. `start` performs the
//! single bundle fetch; after that, search input and pin clicks are plain
//! `&mut self` handlers that re-render and report UI effects (the one-shot
//! scroll to search results).

use crate::catalog::{Affordance, ComponentIndex};
use crate::pinned::{PinSource, PinnedSet, resolve_initial};
use crate::render::{RenderedView, ScrollLatch, render};
use crate::source::BundleSource;
use crate::sync::{Location, PinStorage, persist, write_url};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// Page body shown once the bundle cannot be loaded.
pub const LOAD_ERROR_MARKUP: &str =
    r#"<p style="color: red;">Error: Could not load page components. Please try again later.</p>"#;
pub const SEARCH_PLACEHOLDER: &str = "Search for components...";
/// Attribute on pin/unpin buttons naming their component.
pub const COMPONENT_ATTRIBUTE: &str = "data-component";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SearchBox {
    pub enabled: bool,
    pub placeholder: String,
    pub value: String,
}

/// Side effects the host page should perform after a handler returns.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiEffect {
    /// Smooth-scroll the search region into view.
    ScrollToSearch,
}

/// One node on a click's propagation path.
#[derive(Clone, Debug, Default)]
pub struct Element {
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The button a rendered card carries.
    pub fn button(affordance: Affordance, component: &str) -> Self {
        Self::new()
            .with_class(affordance.class())
            .with_attribute(COMPONENT_ATTRIBUTE, component)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn affordance(&self) -> Option<Affordance> {
        self.classes.iter().find_map(|c| Affordance::from_class(c))
    }
}

/// Closest pin/unpin affordance on a path ordered target-first.
///
/// Returns the component name it carries; an affordance without the
/// attribute stops the search and yields `None`.
pub fn find_affordance(path: &[Element]) -> Option<(Affordance, &str)> {
    let element = path.iter().find(|el| el.affordance().is_some())?;
    let affordance = element.affordance()?;
    let name = element.attribute(COMPONENT_ATTRIBUTE)?;
    Some((affordance, name))
}

pub struct Controller<L, S> {
    phase: Phase,
    location: L,
    storage: S,
    index: Option<ComponentIndex>,
    pinned: PinnedSet,
    pin_source: Option<PinSource>,
    search_box: SearchBox,
    view: RenderedView,
    latch: ScrollLatch,
    body_override: Option<String>,
}

impl<L: Location, S: PinStorage> Controller<L, S> {
    /// A controller in `Loading` with a disabled search box.
    pub fn new(location: L, storage: S) -> Self {
        Self {
            phase: Phase::Loading,
            location,
            storage,
            index: None,
            pinned: PinnedSet::new(),
            pin_source: None,
            search_box: SearchBox::default(),
            view: RenderedView::default(),
            latch: ScrollLatch::default(),
            body_override: None,
        }
    }

    /// Fetch the bundle and enter `Ready` or `Failed`.
    ///
    /// Only the first call does anything; both outcomes are terminal for the
    /// loading step.
    pub fn start<B>(&mut self, source: &B) -> Vec<UiEffect>
    where
        B: BundleSource + ?Sized,
    {
        if self.phase != Phase::Loading {
            return Vec::new();
        }

        let index = match load_index(source) {
            Ok(index) => index,
            Err(err) => {
                error!(error = %format!("{err:#}"), "could not load component data");
                self.phase = Phase::Failed;
                self.body_override = Some(LOAD_ERROR_MARKUP.to_string());
                return Vec::new();
            }
        };

        let resolution = resolve_initial(self.location.current(), &self.storage, &index);
        self.pinned = resolution.pinned;
        self.pin_source = Some(resolution.source);
        self.index = Some(index);

        let effects = self.rerender();
        if let Some(index) = self.index.as_ref() {
            write_url(&mut self.location, &self.pinned, index);
        }

        self.search_box.enabled = true;
        self.search_box.placeholder = SEARCH_PLACEHOLDER.to_string();
        self.phase = Phase::Ready;
        info!(
            pinned = self.pinned.len(),
            source = ?self.pin_source,
            "pin/search controller ready"
        );
        effects
    }

    /// Handle a new search box value. Ignored until `Ready`.
    pub fn on_search_input(&mut self, value: &str) -> Vec<UiEffect> {
        if self.phase != Phase::Ready {
            return Vec::new();
        }
        self.search_box.value = value.to_string();
        self.rerender()
    }

    /// Handle a document click given its target-first propagation path.
    pub fn on_click(&mut self, path: &[Element]) -> Vec<UiEffect> {
        if self.phase != Phase::Ready {
            return Vec::new();
        }
        let Some((_, name)) = find_affordance(path) else {
            return Vec::new();
        };
        let name = name.to_string();
        self.toggle(&name)
    }

    /// Flip one component's pin, persist, and re-render.
    pub fn toggle(&mut self, name: &str) -> Vec<UiEffect> {
        let Some(index) = self.index.as_ref() else {
            return Vec::new();
        };
        let now_pinned = self.pinned.toggle(name);
        debug!(component = name, pinned = now_pinned, "toggled pin");
        persist(&mut self.location, &mut self.storage, &self.pinned, index);
        self.rerender()
    }

    fn rerender(&mut self) -> Vec<UiEffect> {
        let Some(index) = self.index.as_ref() else {
            return Vec::new();
        };
        self.view = render(index, &self.pinned, &self.search_box.value);
        if self.latch.observe(&self.view) {
            vec![UiEffect::ScrollToSearch]
        } else {
            Vec::new()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pinned(&self) -> &PinnedSet {
        &self.pinned
    }

    /// Which input seeded the pinned set, once `Ready`.
    pub fn pin_source(&self) -> Option<PinSource> {
        self.pin_source
    }

    pub fn view(&self) -> &RenderedView {
        &self.view
    }

    pub fn search_box(&self) -> &SearchBox {
        &self.search_box
    }

    /// Replacement page body after a load failure.
    pub fn body_override(&self) -> Option<&str> {
        self.body_override.as_deref()
    }

    pub fn index(&self) -> Option<&ComponentIndex> {
        self.index.as_ref()
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Hand back the surfaces, e.g. to flush a file-backed store.
    pub fn into_parts(self) -> (L, S) {
        (self.location, self.storage)
    }
}

fn load_index<B>(source: &B) -> Result<ComponentIndex>
where
    B: BundleSource + ?Sized,
{
    let body = source.fetch()?.into_body()?;
    ComponentIndex::from_json(&body).context("invalid component bundle")
}
