//! JSON Schema loading for the component bundle.
//!
//! The canonical schema ships in `schema/components.schema.json` and is
//! compiled into the binary, so bundles are validated the same way whether
//! they come from disk or from a test fixture.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

const EMBEDDED_BUNDLE_SCHEMA: &str = include_str!("../schema/components.schema.json");

/// Compiled bundle schema plus its title for error messages.
pub(crate) struct BundleSchema {
    pub compiled: JSONSchema,
    pub title: String,
}

pub(crate) fn load_bundle_schema() -> Result<BundleSchema> {
    let raw: Value =
        serde_json::from_str(EMBEDDED_BUNDLE_SCHEMA).context("parsing embedded bundle schema")?;
    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("bundle schema")
        .to_string();
    let compiled =
        JSONSchema::compile(&raw).map_err(|err| anyhow!("compiling {title}: {err}"))?;

    Ok(BundleSchema { compiled, title })
}

/// Validate a parsed bundle document, joining every violation into one error.
pub(crate) fn validate_bundle_value(schema: &BundleSchema, value: &Value) -> Result<()> {
    if let Err(errors) = schema.compiled.validate(value) {
        let details = errors
            .map(|err| format!("{} at '{}'", err, err.instance_path))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("component bundle failed {} validation:\n{}", schema.title, details);
    }
    Ok(())
}
