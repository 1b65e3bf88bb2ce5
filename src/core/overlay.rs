//! The overlay stack of configuration sources.

use crate::Mapping;
use crate::core::{ConfigLoader, Key, NestedLookup, OverlayConfigBuilder};
use crate::error::{ConfigError, Result};
use crate::sources::{DEFAULTS_LABEL, Source};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::ops::{Index, IndexMut};
use std::path::Path;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// An ordered stack of configuration sources with first-match-wins lookup.
///
/// Index 0 has the highest priority. A lookup scans the sources in order and
/// returns the value from the first one whose top-level mapping contains the
/// key, even when that value is `null`, `false` or empty.
///
/// Writes never touch file-backed sources. [`set`](Self::set) stores values in
/// the `<defaults>` source, creating and appending it when needed, so a value
/// that is also defined by an earlier source stays shadowed. Use
/// [`insert`](Self::insert) at index 0 to override everything.
///
/// # Clone semantics
///
/// Cloning produces an independent source list whose mappings are shared with
/// the original through [`Arc`]. Structural changes (`append`, `insert`,
/// `delete_at`) on one instance are invisible to the other. Writes through
/// `set` copy the shared defaults mapping first, so they stay local too.
///
/// # Examples
///
/// ```rust,no_run
/// use overlay_config::prelude::*;
/// use serde_json::json;
///
/// # fn example() -> Result<()> {
/// let mut config = OverlayConfig::builder()
///     .with_scope("myapp")
///     .with_filenames(["config.yaml", "conf.d/*.yaml"])
///     .with_default("log_level", "info")
///     .build()?;
///
/// let fallback = json!("warn");
/// let level = config.get_or("log_level", &fallback);
/// println!("log level: {}", level);
///
/// config.set("retries", 3);
/// assert!(config.has_key("retries"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    loader: ConfigLoader,
    sources: Vec<Source>,
}

impl OverlayConfig {
    /// Create a new builder for constructing an overlay.
    pub fn builder() -> OverlayConfigBuilder {
        OverlayConfigBuilder::new()
    }

    /// An overlay with no sources that never searches the filesystem.
    pub fn empty() -> Self {
        Self {
            loader: ConfigLoader::empty(),
            sources: Vec::new(),
        }
    }

    pub(crate) fn with_loader(loader: ConfigLoader, sources: Vec<Source>) -> Self {
        Self { loader, sources }
    }

    /// Discard all sources and load the configuration files again.
    ///
    /// If a `<defaults>` source is present it is carried over and appended
    /// after the reloaded files, including values written with `set`.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected file cannot be read or parsed. The
    /// current sources are left untouched in that case.
    pub fn reload(&mut self) -> Result<()> {
        let loaded = self.load_sources()?;
        self.replace_loaded(loaded);
        Ok(())
    }

    /// Read and parse the configuration files without touching the stack.
    pub(crate) fn load_sources(&self) -> Result<Vec<Source>> {
        self.loader.load()
    }

    /// Replace the stack with `loaded`, keeping the current `<defaults>` source last.
    pub(crate) fn replace_loaded(&mut self, mut loaded: Vec<Source>) {
        if let Some(defaults) = self.sources.iter().find(|s| s.is_defaults()) {
            loaded.push(defaults.clone());
        }
        self.sources = loaded;
    }

    /// Parse one file with the configured format rules and append it.
    ///
    /// Returns `false` when the file was skipped because its format is not
    /// known.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        match self.loader.load_file(path.as_ref())? {
            Some(source) => {
                self.sources.push(source);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Append a source with the lowest priority.
    pub fn append(&mut self, label: impl Into<String>, content: impl Into<Arc<Mapping>>) {
        self.sources.push(Source::new(label, content));
    }

    /// Insert a source at `index`, shifting later sources down.
    ///
    /// An index past the end appends. Inserting at 0 gives the source the
    /// highest priority.
    pub fn insert(
        &mut self,
        index: usize,
        label: impl Into<String>,
        content: impl Into<Arc<Mapping>>,
    ) {
        let index = index.min(self.sources.len());
        self.sources.insert(index, Source::new(label, content));
    }

    /// Remove and return the source at `index`, or `None` if out of range.
    pub fn delete_at(&mut self, index: usize) -> Option<Source> {
        (index < self.sources.len()).then(|| self.sources.remove(index))
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether there are no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The value of `name` from the first source that defines it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.sources.iter().find_map(|s| s.content().get(name))
    }

    /// The value of `name`, or `default` when no source defines it.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
        self.get(name).unwrap_or(default)
    }

    /// Resolve a key or key path in the first source where it resolves.
    ///
    /// ```rust
    /// use overlay_config::prelude::*;
    /// use serde_json::json;
    ///
    /// let mut config = OverlayConfig::empty();
    /// config.append("<a>", json!({"db": {"host": "a"}}).as_object().unwrap().clone());
    /// config.append("<b>", json!({"db": {"port": 5432}}).as_object().unwrap().clone());
    ///
    /// assert_eq!(config.get_path(&["db", "port"]), Some(&json!(5432)));
    /// ```
    pub fn get_path<'k>(&self, key: impl Into<Key<'k>>) -> Option<&Value> {
        let key = key.into();
        self.sources.iter().find_map(|s| s.content().lookup(key))
    }

    /// Deserialize the value of `name` into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value exists but does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.get(name)
            .map(|value| {
                T::deserialize(value).map_err(|e| {
                    ConfigError::DeserializationError(format!("Key '{}': {}", name, e))
                })
            })
            .transpose()
    }

    /// Whether any source defines `name`.
    pub fn has_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Store `value` under `name` in the `<defaults>` source.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.defaults_mut().insert(name.into(), value.into());
    }

    /// The `<defaults>` mapping, appended as the last source if missing.
    fn defaults_mut(&mut self) -> &mut Mapping {
        let index = match self.sources.iter().position(Source::is_defaults) {
            Some(index) => index,
            None => {
                self.sources.push(Source::new(DEFAULTS_LABEL, Mapping::new()));
                self.sources.len() - 1
            }
        };
        self.sources[index].content_mut()
    }

    /// Call `visitor` with the label and content of every source, in order.
    pub fn each<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &Mapping),
    {
        for source in &self.sources {
            visitor(source.label(), source.content());
        }
    }

    /// Iterate over the sources in priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, Source> {
        self.sources.iter()
    }

    /// The sources in priority order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Labels of all sources in priority order.
    pub fn labels(&self) -> Vec<&str> {
        self.sources.iter().map(Source::label).collect()
    }

    /// Flatten the stack into one mapping.
    ///
    /// Each top-level key takes its value from the first source that defines
    /// it, which matches what [`get`](Self::get) returns. Nested mappings are
    /// not merged.
    pub fn merged(&self) -> Mapping {
        let mut merged = Mapping::new();
        for source in &self.sources {
            for (key, value) in source.content() {
                if !merged.contains_key(key) {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }

    /// Deserialize the merged view into a typed configuration structure.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged values do not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.merged())).map_err(|e| {
            ConfigError::DeserializationError(format!("Failed to deserialize configuration: {}", e))
        })
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<&str> for OverlayConfig {
    type Output = Value;

    /// Same as [`get`](OverlayConfig::get), yielding `Value::Null` when absent.
    fn index(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&NULL)
    }
}

impl IndexMut<&str> for OverlayConfig {
    /// The entry for `name` in the `<defaults>` source, created as `null`.
    fn index_mut(&mut self, name: &str) -> &mut Value {
        self.defaults_mut().entry(name).or_insert(Value::Null)
    }
}

impl<'a> IntoIterator for &'a OverlayConfig {
    type Item = &'a Source;
    type IntoIter = std::slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

impl Serialize for OverlayConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.sources)
    }
}
