//! Serde-facing sanitizer configuration and structural merging.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Attribute-map key that applies to every element.
pub const ALL_ELEMENTS: &str = ":all";

/// Protocol-list entry allowing URLs without a scheme.
pub const RELATIVE: &str = ":relative";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SanitizerConfig {
    /// Tag names that survive sanitization.
    pub elements: BTreeSet<String>,
    /// Tag name (or `:all`) to allowed attribute names.
    pub attributes: BTreeMap<String, BTreeSet<String>>,
    /// Tag name to attribute name to allowed schemes; `:relative` allows schemeless URLs.
    pub protocols: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// Tag name (or `:all`) to the class names an allowed `class` attribute
    /// may keep. With no entry for an element or `:all`, any class is kept.
    pub classes: BTreeMap<String, BTreeSet<String>>,
    pub remove_contents: RemoveContents,
    /// Denied elements in this set leave a space where their boundaries were.
    pub whitespace_elements: BTreeSet<String>,
    pub allow_comments: bool,
    pub allow_doctype: bool,
    /// Strip escape-worthy tags (`script`, `textarea`, ...) that handlers
    /// insert into sanitized output.
    pub escape_tagfilter: bool,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            elements: BTreeSet::new(),
            attributes: BTreeMap::new(),
            protocols: BTreeMap::new(),
            classes: BTreeMap::new(),
            remove_contents: RemoveContents::default(),
            whitespace_elements: BTreeSet::new(),
            allow_comments: false,
            allow_doctype: true,
            escape_tagfilter: true,
        }
    }
}

/// Which denied elements lose their contents as well as their tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoveContents {
    /// `true` removes the contents of every denied element.
    All(bool),
    Elements(BTreeSet<String>),
}

impl Default for RemoveContents {
    fn default() -> Self {
        RemoveContents::All(false)
    }
}

impl SanitizerConfig {
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value, ConfigError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deep-merge `overrides` onto this configuration, returning a new one.
    pub fn merged(&self, overrides: &Value) -> Result<Self, ConfigError> {
        Self::from_value(merge(&self.to_value()?, overrides)?)
    }
}

/// Structural deep merge: mappings merge key by key, anything else in
/// `overrides` replaces the base value. Neither input is modified.
pub fn merge(base: &Value, overrides: &Value) -> Result<Value, ConfigError> {
    let Value::Object(base_map) = base else {
        return Err(ConfigError::NotAMapping(kind(base)));
    };
    let Value::Object(override_map) = overrides else {
        return Err(ConfigError::NotAMapping(kind(overrides)));
    };
    let mut merged = base_map.clone();
    for (key, value) in override_map {
        let next = match (merged.get(key), value) {
            (Some(existing @ Value::Object(_)), Value::Object(_)) => merge(existing, value)?,
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    Ok(Value::Object(merged))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
