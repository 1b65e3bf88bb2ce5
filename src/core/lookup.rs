//! Nested key lookup over parsed configuration trees.

use crate::Mapping;
use serde_json::Value;

/// A lookup key: a single top-level name or a path of names into nested mappings.
///
/// Keys are plain strings. Every mapping key is normalized to its string form
/// when a file is parsed, so a YAML key written as `1` is looked up as `"1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// A key in the outermost mapping.
    Name(&'a str),
    /// A sequence of keys, one per nesting level.
    Path(&'a [&'a str]),
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Key::Name(name)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(name: &'a String) -> Self {
        Key::Name(name)
    }
}

impl<'a, 'b: 'a> From<&'a [&'b str]> for Key<'a> {
    fn from(path: &'a [&'b str]) -> Self {
        Key::Path(path)
    }
}

impl<'a, 'b: 'a, const N: usize> From<&'a [&'b str; N]> for Key<'a> {
    fn from(path: &'a [&'b str; N]) -> Self {
        Key::Path(path)
    }
}

impl<'a, 'b: 'a> From<&'a Vec<&'b str>> for Key<'a> {
    fn from(path: &'a Vec<&'b str>) -> Self {
        Key::Path(path)
    }
}

/// Lookup of single keys and key paths that never fails.
///
/// A path is resolved one level at a time. If a segment is missing, or a
/// value before the last segment is not a mapping, the lookup yields `None`
/// rather than a partial result. An empty path matches nothing.
///
/// # Examples
///
/// ```rust
/// use overlay_config::prelude::*;
/// use serde_json::json;
///
/// let tree = json!({"hash": {"cascade": {"final": "inner value"}}});
///
/// assert_eq!(tree.lookup(&["hash", "cascade", "final"]), Some(&json!("inner value")));
/// assert_eq!(tree.lookup(&["hash", "cascade", "missing"]), None);
///
/// let fallback = json!("default value");
/// assert_eq!(tree.lookup_or("missing", &fallback), &fallback);
/// ```
pub trait NestedLookup {
    /// Resolve `key`, returning `None` when it is absent at any depth.
    fn lookup<'k>(&self, key: impl Into<Key<'k>>) -> Option<&Value>;

    /// Resolve `key`, falling back to `default` when it is absent.
    fn lookup_or<'a, 'k>(&'a self, key: impl Into<Key<'k>>, default: &'a Value) -> &'a Value {
        self.lookup(key).unwrap_or(default)
    }
}

impl NestedLookup for Mapping {
    fn lookup<'k>(&self, key: impl Into<Key<'k>>) -> Option<&Value> {
        match key.into() {
            Key::Name(name) => self.get(name),
            Key::Path(path) => descend(self, path),
        }
    }
}

impl NestedLookup for Value {
    fn lookup<'k>(&self, key: impl Into<Key<'k>>) -> Option<&Value> {
        match self {
            Value::Object(mapping) => mapping.lookup(key),
            _ => None,
        }
    }
}

fn descend<'a>(mapping: &'a Mapping, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let value = mapping.get(*first)?;
    if rest.is_empty() {
        return Some(value);
    }
    match value {
        Value::Object(inner) => descend(inner, rest),
        _ => None,
    }
}
