//! Dotted key paths into the frontmatter document.
//!
//! A row in an infobox table displays a frontmatter value through a formula reference such as
//! `` `=this.stats.strength` ``. The part after `this.` is a [`Key`]: an ordered list of mapping
//! keys walked from the root of the document. The free functions below implement the walk
//! generically over [`serde_yaml::Value`] and operate on plain segment slices so that callers
//! holding a borrowed path do not need to build a `Key` first.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fmt;

/// Prefix of a formula reference that reads from the current document.
pub const FORMULA_PREFIX: &str = "=this.";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
/// Non-empty path of mapping keys, e.g. `["stats", "strength"]`.
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    #[must_use]
    /// Parse a dotted path such as `stats.strength`.
    ///
    /// Returns `None` for an empty path or one containing an empty segment (`a..b`, `.a`).
    pub fn new(dotted: &str) -> Option<Self> {
        let segments: Vec<String> = dotted.trim().split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { segments })
    }

    #[must_use]
    /// Parse a formula reference (`=this.stats.strength`, backticks optional).
    pub fn from_formula(formula: &str) -> Option<Self> {
        let formula = formula.trim().trim_matches('`');
        Self::new(formula.strip_prefix(FORMULA_PREFIX)?)
    }

    #[must_use]
    /// Build a key from already separated segments.
    pub fn from_segments(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { segments })
    }

    #[must_use]
    /// Path segments from the document root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    /// Dotted form as written in a formula reference.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    #[must_use]
    /// Formula reference text (without backticks) for this key.
    pub fn formula(&self) -> String {
        format!("{FORMULA_PREFIX}{}", self.dotted())
    }

    #[must_use]
    /// Value stored under this key, if every segment is present.
    pub fn get<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        resolve(doc, &self.segments)
    }

    /// Store `value` under this key, creating intermediate mappings.
    pub fn set(&self, doc: &mut Value, value: Value) {
        assign(doc, &self.segments, value);
    }

    /// Remove the value under this key, returning it if it was present.
    pub fn delete(&self, doc: &mut Value) -> Option<Value> {
        remove(doc, &self.segments)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

#[must_use]
/// Frontmatter key derived from a human label: lower-cased, whitespace runs become `_`.
///
/// `"Base Stats"` becomes `base_stats`, so the generated formula stays a valid dotted path.
pub fn slug(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[must_use]
/// Look up `path` in `doc` without creating anything.
pub fn resolve<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    let Some((head, rest)) = path.split_first() else {
        return Some(doc);
    };
    let next = doc.as_mapping()?.get(head.as_str())?;
    resolve(next, rest)
}

/// Store `value` at `path`, creating (or replacing non-mapping) intermediates with mappings.
pub fn assign(doc: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *doc = value;
        return;
    };
    let map = ensure_mapping(doc);
    let key = Value::String(head.clone());
    if rest.is_empty() {
        map.insert(key, value);
        return;
    }
    if !map.contains_key(head.as_str()) {
        map.insert(key.clone(), Value::Mapping(Mapping::new()));
    }
    if let Some(child) = map.get_mut(head.as_str()) {
        assign(child, rest, value);
    }
}

/// Delete the final segment of `path`; absent intermediates make this a no-op.
///
/// Ancestors left empty by the removal are kept.
pub fn remove(doc: &mut Value, path: &[String]) -> Option<Value> {
    let (head, rest) = path.split_first()?;
    let map = doc.as_mapping_mut()?;
    if rest.is_empty() {
        return map.shift_remove(head.as_str());
    }
    remove(map.get_mut(head.as_str())?, rest)
}

fn ensure_mapping(doc: &mut Value) -> &mut Mapping {
    if !doc.is_mapping() {
        *doc = Value::Mapping(Mapping::new());
    }
    match doc {
        Value::Mapping(map) => map,
        _ => unreachable!("value was just replaced by a mapping"),
    }
}

#[cfg(test)]
#[path = "tests/key.rs"]
mod tests;
