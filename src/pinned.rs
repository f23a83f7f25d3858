//! Pinned-set state and its two encodings.
//!
//! The URL carries aliases (`?pinned=a,b`) so links stay short; storage
//! carries canonical names as a JSON list. `resolve_initial` picks the
//! startup set with URL > storage > defaults priority, where a present but
//! empty `pinned=` is an explicit "pin nothing".

use crate::catalog::{ComponentIndex, ComponentName};
use crate::sync::PinStorage;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use url::Url;
use url::form_urlencoded::byte_serialize;

/// Query parameter holding the comma-joined aliases.
pub const PIN_PARAM: &str = "pinned";
/// Storage key holding the JSON list of canonical names.
pub const STORAGE_KEY: &str = "pinnedComponents";

/// Deduplicated pinned names in insertion order.
///
/// Equality ignores order; iteration order is what the pinned region and the
/// encodings follow.
#[derive(Clone, Debug, Default)]
pub struct PinnedSet {
    names: Vec<ComponentName>,
    // Slot freed by the last toggle-off, so an immediate re-pin lands back in place.
    vacated: Option<(ComponentName, usize)>,
}

impl PinnedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, keeping the first occurrence of each name.
    pub fn from_names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ComponentName>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(name.into());
        }
        set
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.as_str() == name)
    }

    /// Returns false when the name was already pinned.
    pub fn insert(&mut self, name: ComponentName) -> bool {
        if self.contains(name.as_str()) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Returns false when the name was not pinned.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n.as_str() != name);
        self.names.len() != before
    }

    /// Flip membership; returns whether the name is pinned afterwards.
    ///
    /// Re-pinning the name that was just unpinned restores its old position;
    /// any other pin appends.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(pos) = self.names.iter().position(|n| n.as_str() == name) {
            let removed = self.names.remove(pos);
            self.vacated = Some((removed, pos));
            return false;
        }
        let slot = match self.vacated.take() {
            Some((vacated, pos)) if vacated.as_str() == name && pos <= self.names.len() => pos,
            _ => self.names.len(),
        };
        self.names.insert(slot, ComponentName::from(name));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentName> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[ComponentName] {
        &self.names
    }
}

impl PartialEq for PinnedSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|name| other.contains(name.as_str()))
    }
}

impl Eq for PinnedSet {}

impl<N: Into<ComponentName>> FromIterator<N> for PinnedSet {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}

/// Which input decided the startup pinned set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PinSource {
    Url,
    Storage,
    Defaults,
}

#[derive(Clone, Debug)]
pub struct Resolution {
    pub pinned: PinnedSet,
    pub source: PinSource,
}

/// Value of the first `pinned` parameter, form-decoded.
///
/// `None` means the parameter is absent; `Some("")` means present but empty.
pub fn pinned_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == PIN_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Map comma-separated aliases back to names, dropping unknown tokens.
pub fn decode_pinned_param(value: &str, index: &ComponentIndex) -> PinnedSet {
    if value.is_empty() {
        return PinnedSet::new();
    }
    value
        .split(',')
        .filter_map(|token| {
            let resolved = index.name_for_alias(token).cloned();
            if resolved.is_none() {
                debug!(alias = token, "dropping unresolvable pinned alias");
            }
            resolved
        })
        .collect()
}

/// Comma-join the aliases of pinned names; names without an alias are skipped.
pub fn encode_pinned_param(pinned: &PinnedSet, index: &ComponentIndex) -> String {
    pinned
        .iter()
        .filter_map(|name| index.alias_for(name.as_str()))
        .map(|alias| alias.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Query-ready form of the pinned aliases.
///
/// Each alias is form-encoded on its own and the results are joined with a
/// literal `,`, so `pinned_param` reads back exactly what
/// `encode_pinned_param` produced.
pub fn encode_pinned_query(pinned: &PinnedSet, index: &ComponentIndex) -> String {
    pinned
        .iter()
        .filter_map(|name| index.alias_for(name.as_str()))
        .map(|alias| byte_serialize(alias.as_str().as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse the stored JSON list; anything else is treated as no stored state.
pub fn parse_stored(raw: &str) -> Option<PinnedSet> {
    match serde_json::from_str::<Vec<ComponentName>>(raw) {
        Ok(names) => Some(PinnedSet::from_names(names)),
        Err(err) => {
            warn!(error = %err, "ignoring malformed {STORAGE_KEY} value");
            None
        }
    }
}

/// JSON list of canonical names in set order.
pub fn serialize_stored(pinned: &PinnedSet) -> Result<String> {
    serde_json::to_string(pinned.names()).context("serializing pinned components")
}

/// Decide the startup pinned set: URL, then storage, then defaults.
pub fn resolve_initial<S>(url: &Url, storage: &S, index: &ComponentIndex) -> Resolution
where
    S: PinStorage + ?Sized,
{
    if let Some(param) = pinned_param(url) {
        let pinned = decode_pinned_param(&param, index);
        info!(count = pinned.len(), "pinned state restored from URL");
        return Resolution {
            pinned,
            source: PinSource::Url,
        };
    }

    let stored = match storage.get_item(STORAGE_KEY) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "unable to read pinned state from storage");
            None
        }
    };
    if let Some(pinned) = stored.as_deref().and_then(parse_stored) {
        info!(count = pinned.len(), "pinned state restored from storage");
        return Resolution {
            pinned,
            source: PinSource::Storage,
        };
    }

    let pinned = PinnedSet::from_names(index.default_pinned().iter().cloned());
    info!(count = pinned.len(), "pinned state seeded from defaults");
    Resolution {
        pinned,
        source: PinSource::Defaults,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::MemoryStorage;

    fn index() -> ComponentIndex {
        ComponentIndex::from_json(
            r#"{
                "components": {
                    "Alpha": {"content": "<p>A</p>"},
                    "Beta": {"content": "<p>B</p>"},
                    "Gamma": {"content": "<p>G</p>"}
                },
                "aliases": {"Alpha": "a", "Beta": "b"},
                "defaultPinned": ["Alpha"]
            }"#,
        )
        .unwrap()
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn set_dedups_and_keeps_insertion_order() {
        let set = PinnedSet::from_names(["Beta", "Alpha", "Beta"]);
        let names: Vec<&str> = set.iter().map(ComponentName::as_str).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert_eq!(set, PinnedSet::from_names(["Alpha", "Beta"]));
    }

    #[test]
    fn toggle_flips_membership() {
        let mut set = PinnedSet::from_names(["Alpha"]);
        assert!(set.toggle("Beta"));
        assert!(set.contains("Beta"));
        assert!(!set.toggle("Beta"));
        assert_eq!(set, PinnedSet::from_names(["Alpha"]));
    }

    #[test]
    fn toggle_off_then_on_restores_position() {
        let mut set = PinnedSet::from_names(["Alpha", "Beta", "Gamma"]);
        assert!(!set.toggle("Alpha"));
        assert!(set.toggle("Alpha"));
        let names: Vec<&str> = set.iter().map(ComponentName::as_str).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);

        // Another unpin in between forgets the slot.
        assert!(!set.toggle("Beta"));
        assert!(!set.toggle("Gamma"));
        assert!(set.toggle("Beta"));
        let names: Vec<&str> = set.iter().map(ComponentName::as_str).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn query_form_escapes_reserved_characters_per_alias() {
        let index = ComponentIndex::from_json(
            r#"{
                "components": {"C++": {"content": ""}, "Q&A": {"content": ""}, "Alpha": {"content": ""}},
                "aliases": {"C++": "c++", "Q&A": "q&a", "Alpha": "a"},
                "defaultPinned": []
            }"#,
        )
        .unwrap();
        let set = PinnedSet::from_names(["C++", "Q&A", "Alpha"]);
        assert_eq!(encode_pinned_param(&set, &index), "c++,q&a,a");
        assert_eq!(encode_pinned_query(&set, &index), "c%2B%2B,q%26a,a");

        let url = url(&format!("http://x.test/?pinned={}", encode_pinned_query(&set, &index)));
        let param = pinned_param(&url).unwrap();
        assert_eq!(param, "c++,q&a,a");
        assert_eq!(decode_pinned_param(&param, &index), set);
    }

    #[test]
    fn decode_drops_unknown_tokens() {
        let index = index();
        let set = decode_pinned_param("b,zz,,a,b", &index);
        let names: Vec<&str> = set.iter().map(ComponentName::as_str).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn encode_skips_names_without_alias() {
        let index = index();
        let set = PinnedSet::from_names(["Gamma", "Beta", "Alpha"]);
        assert_eq!(encode_pinned_param(&set, &index), "b,a");
        assert_eq!(encode_pinned_param(&PinnedSet::new(), &index), "");
    }

    #[test]
    fn pinned_param_distinguishes_absent_from_empty() {
        assert_eq!(pinned_param(&url("http://x.test/p")), None);
        assert_eq!(pinned_param(&url("http://x.test/p?pinned=")), Some(String::new()));
        assert_eq!(
            pinned_param(&url("http://x.test/p?other=1&pinned=a%2Cb&pinned=c")),
            Some("a,b".to_string())
        );
    }

    #[test]
    fn explicit_empty_url_param_overrides_storage_and_defaults() {
        let index = index();
        let mut storage = MemoryStorage::default();
        storage.insert(STORAGE_KEY, r#"["Beta"]"#);
        let resolution = resolve_initial(&url("http://x.test/?pinned="), &storage, &index);
        assert_eq!(resolution.source, PinSource::Url);
        assert!(resolution.pinned.is_empty());
    }

    #[test]
    fn storage_used_when_param_absent() {
        let index = index();
        let mut storage = MemoryStorage::default();
        storage.insert(STORAGE_KEY, r#"["Alpha","Beta"]"#);
        let resolution = resolve_initial(&url("http://x.test/"), &storage, &index);
        assert_eq!(resolution.source, PinSource::Storage);
        assert_eq!(resolution.pinned, PinnedSet::from_names(["Alpha", "Beta"]));
    }

    #[test]
    fn malformed_storage_falls_back_to_defaults() {
        let index = index();
        let mut storage = MemoryStorage::default();
        storage.insert(STORAGE_KEY, "{\"Alpha\": true}");
        let resolution = resolve_initial(&url("http://x.test/"), &storage, &index);
        assert_eq!(resolution.source, PinSource::Defaults);
        assert_eq!(resolution.pinned, PinnedSet::from_names(["Alpha"]));
    }

    #[test]
    fn stored_list_round_trips_names() {
        let set = PinnedSet::from_names(["Gamma", "Alpha"]);
        let raw = serialize_stored(&set).unwrap();
        assert_eq!(raw, r#"["Gamma","Alpha"]"#);
        assert_eq!(parse_stored(&raw), Some(set));
    }
}
