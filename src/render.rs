//! Markup for the pinned and search regions.
//!
//! Rendering is total: every call rebuilds both regions from the catalog, the
//! pinned set, and the raw search box value. Component content is trusted
//! markup from the bundle and is inserted verbatim; names are escaped.

use crate::catalog::{Affordance, ComponentIndex};
use crate::pinned::PinnedSet;
use serde::Serialize;

/// Queries shorter than this (after trimming) leave the search region empty.
pub const MIN_QUERY_LENGTH: usize = 3;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub pinned: String,
    pub search: String,
    /// The query met the length threshold.
    pub searching: bool,
    pub pinned_cards: usize,
    pub search_results: usize,
}

/// Trimmed, lower-cased query, or `None` below the length threshold.
pub fn normalize_query(raw: &str) -> Option<String> {
    let query = raw.trim().to_lowercase();
    (query.chars().count() >= MIN_QUERY_LENGTH).then_some(query)
}

pub fn render(index: &ComponentIndex, pinned: &PinnedSet, raw_query: &str) -> RenderedView {
    let mut view = RenderedView::default();

    for name in pinned.iter() {
        if let Some(entry) = index.component(name.as_str()) {
            view.pinned
                .push_str(&render_card(name.as_str(), &entry.content, true));
            view.pinned_cards += 1;
        }
    }

    if let Some(query) = normalize_query(raw_query) {
        view.searching = true;
        for (name, entry) in index.components() {
            if pinned.contains(name.as_str()) {
                continue;
            }
            if name.as_str().to_lowercase().contains(&query) {
                view.search
                    .push_str(&render_card(name.as_str(), &entry.content, false));
                view.search_results += 1;
            }
        }
    }

    view
}

/// One card with a header, a pin/unpin button, and the component content.
pub fn render_card(name: &str, content: &str, pinned: bool) -> String {
    let affordance = Affordance::for_pinned(pinned);
    let name = escape_html(name);
    format!(
        r#"
<div class="card" data-component-name="{name}">
    <div class="card-header">
        <h2>{name}</h2>
        <button class="{class}" data-component="{name}">
            {label}
        </button>
    </div>
    {content}
</div>
"#,
        class = affordance.class(),
        label = affordance.label(),
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Emits one scroll request when a search starts with results.
///
/// Fires only on the step from not searching to searching with at least one
/// result. Re-arms once the query drops below the length threshold; result
/// counts changing during an active search never fire it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollLatch {
    searching: bool,
}

impl ScrollLatch {
    pub fn observe(&mut self, view: &RenderedView) -> bool {
        let fire = !self.searching && view.searching && view.search_results > 0;
        self.searching = view.searching;
        fire
    }
}
