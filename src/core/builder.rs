//! Builder for constructing OverlayConfig instances.

use crate::Mapping;
use crate::core::{ConfigLoader, OverlayConfig};
use crate::error::Result;
use crate::sources::{DEFAULTS_LABEL, Format, Source, default_base_directories};
use serde_json::Value;
use std::path::PathBuf;

/// Scope used when none is given.
pub const DEFAULT_SCOPE: &str = "overlay_config";

/// Filenames tried when none are given.
pub const DEFAULT_FILENAMES: [&str; 2] = ["config.json", "credentials.json"];

/// Builder for constructing an `OverlayConfig` instance.
///
/// Files are searched at `base_directory/scope/filename` for every base
/// directory (outer loop) and every filename (inner loop). Earlier
/// candidates get higher priority. Filenames may be glob patterns such as
/// `conf.d/*.yml`; their matches are loaded in sorted order.
///
/// Without explicit settings the builder uses scope `overlay_config`,
/// filenames `config.json` and `credentials.json`, and the base directories
/// from [`default_base_directories`], resolved when [`build`](Self::build)
/// runs.
///
/// # Examples
///
/// ```rust,no_run
/// use overlay_config::prelude::*;
///
/// # fn example() -> Result<()> {
/// let config = OverlayConfig::builder()
///     .with_scope("myapp")
///     .with_filenames(["config.yml", "conf.d/*.yml"])
///     .with_base_directories(["/etc", "/usr/share"])
///     .with_default_parser(Format::Yaml)
///     .with_default("workers", 4)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OverlayConfigBuilder {
    scope: String,
    filenames: Vec<String>,
    base_directories: Option<Vec<PathBuf>>,
    default_parser: Option<Format>,
    defaults: Option<Mapping>,
}

impl OverlayConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            scope: DEFAULT_SCOPE.to_string(),
            filenames: DEFAULT_FILENAMES.iter().map(|f| f.to_string()).collect(),
            base_directories: None,
            default_parser: None,
            defaults: None,
        }
    }

    /// Set the namespace directory placed between each base directory and
    /// each filename.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Replace the filename patterns, tried in the given order.
    pub fn with_filenames<I, S>(mut self, filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filenames = filenames.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the base directories, tried in the given order.
    ///
    /// A leading `~` is expanded to the home directory and relative paths
    /// are resolved against the current directory.
    pub fn with_base_directories<I, P>(mut self, base_directories: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.base_directories = Some(base_directories.into_iter().map(Into::into).collect());
        self
    }

    /// Parse files with an unrecognized extension as `format`.
    pub fn with_default_parser(mut self, format: Format) -> Self {
        self.default_parser = Some(format);
        self
    }

    /// Use `defaults` as the lowest-priority source.
    ///
    /// An empty mapping adds no source.
    pub fn with_defaults(mut self, defaults: Mapping) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Add a single default value.
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults
            .get_or_insert_with(Mapping::new)
            .insert(name.into(), value.into());
        self
    }

    /// Load the configuration files and build the overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A selected configuration file cannot be read
    /// - A selected configuration file is malformed or not a mapping
    /// - A base directory cannot be resolved to an absolute path
    pub fn build(self) -> Result<OverlayConfig> {
        let loader = ConfigLoader::new(
            self.scope,
            self.filenames,
            self.base_directories.unwrap_or_else(default_base_directories),
            self.default_parser,
        );

        let mut sources = loader.load()?;
        if let Some(defaults) = self.defaults.filter(|d| !d.is_empty()) {
            sources.push(Source::new(DEFAULTS_LABEL, defaults));
        }

        Ok(OverlayConfig::with_loader(loader, sources))
    }
}

impl Default for OverlayConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
