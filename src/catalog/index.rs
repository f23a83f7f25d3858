//! Indexed view of a loaded component bundle.
//!
//! The index validates the bundle against the schema, then builds the lookups
//! the controller needs: catalog order, name → entry, and both directions of
//! the alias table. It is strict about duplicates because a repeated alias
//! would make the `pinned` query parameter ambiguous.

use crate::catalog::model::{ComponentBundle, ComponentEntry};
use crate::catalog::{Alias, ComponentName};
use crate::schema_loader::{load_bundle_schema, validate_bundle_value};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug)]
/// Immutable catalog, alias tables, and default pins.
pub struct ComponentIndex {
    order: Vec<ComponentName>,
    by_name: BTreeMap<ComponentName, ComponentEntry>,
    aliases: BTreeMap<ComponentName, Alias>,
    reverse_aliases: BTreeMap<Alias, ComponentName>,
    default_pinned: Vec<ComponentName>,
}

impl ComponentIndex {
    /// Parse, schema-check, and index bundle JSON text.
    pub fn from_json(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data).context("parsing component bundle")?;
        let schema = load_bundle_schema()?;
        validate_bundle_value(&schema, &value)?;
        // Decode from the text, not the `Value`, so repeated keys survive.
        let bundle = ComponentBundle::from_json(data)?;
        Self::from_bundle(bundle)
    }

    /// Index an already-parsed bundle.
    ///
    /// Rejects repeated component names, repeated alias keys, aliases shared
    /// by two names, and aliases that cannot survive comma-joining.
    pub fn from_bundle(bundle: ComponentBundle) -> Result<Self> {
        let mut order = Vec::with_capacity(bundle.components.len());
        let mut by_name: BTreeMap<ComponentName, ComponentEntry> = BTreeMap::new();
        for (name, entry) in bundle.components.0 {
            if by_name.contains_key(&name) {
                bail!("duplicate component name {name}");
            }
            order.push(name.clone());
            by_name.insert(name, entry);
        }

        let mut aliases: BTreeMap<ComponentName, Alias> = BTreeMap::new();
        let mut reverse_aliases: BTreeMap<Alias, ComponentName> = BTreeMap::new();
        for (name, alias) in bundle.aliases.0 {
            validate_alias(&name, &alias)?;
            if aliases.contains_key(&name) {
                bail!("component {name} declares more than one alias");
            }
            if let Some(existing) = reverse_aliases.get(&alias) {
                bail!("alias '{alias}' is shared by components {existing} and {name}");
            }
            if !by_name.contains_key(&name) {
                warn!(component = %name, alias = %alias, "alias declared for unknown component");
            }
            reverse_aliases.insert(alias.clone(), name.clone());
            aliases.insert(name, alias);
        }

        for name in &bundle.default_pinned {
            if !by_name.contains_key(name) {
                warn!(component = %name, "default pin references unknown component");
            }
        }

        info!(
            components = order.len(),
            aliases = aliases.len(),
            default_pinned = bundle.default_pinned.len(),
            "component bundle indexed"
        );

        Ok(Self {
            order,
            by_name,
            aliases,
            reverse_aliases,
            default_pinned: bundle.default_pinned,
        })
    }

    /// Resolve a component entry by canonical name.
    pub fn component(&self, name: &str) -> Option<&ComponentEntry> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterates components in bundle order.
    pub fn components(&self) -> impl Iterator<Item = (&ComponentName, &ComponentEntry)> {
        self.order
            .iter()
            .filter_map(|name| self.by_name.get(name).map(|entry| (name, entry)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Short alias for a canonical name, if one was declared.
    pub fn alias_for(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    /// Canonical name behind an alias, if any.
    pub fn name_for_alias(&self, alias: &str) -> Option<&ComponentName> {
        self.reverse_aliases.get(alias)
    }

    /// Fallback pins used when neither the URL nor storage has state.
    pub fn default_pinned(&self) -> &[ComponentName] {
        &self.default_pinned
    }
}

fn validate_alias(name: &ComponentName, alias: &Alias) -> Result<()> {
    if alias.as_str().is_empty() {
        bail!("component {name} has an empty alias");
    }
    if alias.as_str().contains(',') {
        bail!("alias '{alias}' for component {name} must not contain ','");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle_json(aliases: &str) -> String {
        format!(
            r#"{{
                "components": {{
                    "Alpha": {{"content": "<p>A</p>"}},
                    "Beta": {{"content": "<p>B</p>"}}
                }},
                "aliases": {aliases},
                "defaultPinned": ["Alpha"]
            }}"#
        )
    }

    #[test]
    fn builds_both_alias_directions() {
        let index = ComponentIndex::from_json(&bundle_json(r#"{"Alpha": "a", "Beta": "b"}"#))
            .unwrap();
        assert_eq!(index.alias_for("Alpha").map(Alias::as_str), Some("a"));
        assert_eq!(
            index.name_for_alias("b").map(ComponentName::as_str),
            Some("Beta")
        );
        assert!(index.name_for_alias("c").is_none());
        let names: Vec<&str> = index.components().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(index.default_pinned(), &[ComponentName::from("Alpha")]);
    }

    #[test]
    fn rejects_shared_alias() {
        let err = ComponentIndex::from_json(&bundle_json(r#"{"Alpha": "x", "Beta": "x"}"#))
            .unwrap_err();
        assert!(format!("{err:#}").contains("shared by components Alpha and Beta"));
    }

    #[test]
    fn rejects_alias_with_comma_or_empty() {
        assert!(ComponentIndex::from_json(&bundle_json(r#"{"Alpha": "a,b"}"#)).is_err());
        assert!(ComponentIndex::from_json(&bundle_json(r#"{"Alpha": ""}"#)).is_err());
    }

    #[test]
    fn rejects_duplicate_component_names() {
        let err = ComponentIndex::from_json(
            r#"{"components": {"A": {"content": ""}, "A": {"content": ""}},
                "aliases": {}, "defaultPinned": []}"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("duplicate component name A"));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(ComponentIndex::from_json("{not json").is_err());
        assert!(ComponentIndex::from_json(r#"{"components": []}"#).is_err());
    }

    #[test]
    fn tolerates_unknown_names_in_aliases_and_defaults() {
        let index = ComponentIndex::from_json(
            r#"{"components": {"A": {"content": ""}},
                "aliases": {"Ghost": "g"}, "defaultPinned": ["Ghost"]}"#,
        )
        .unwrap();
        assert_eq!(
            index.name_for_alias("g").map(ComponentName::as_str),
            Some("Ghost")
        );
        assert!(!index.contains("Ghost"));
    }
}
