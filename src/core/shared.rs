//! Thread-safe handle around an overlay.

use crate::core::OverlayConfig;
use crate::error::Result;
use arc_swap::ArcSwap;
use serde_json::Value;
use std::sync::Arc;

/// A cloneable, thread-safe handle to an [`OverlayConfig`].
///
/// Reads take a lock-free snapshot using `arc-swap`. Changes are made on a
/// copy of the current overlay and swapped in atomically, so readers never
/// observe a half-applied update. Clones of the handle share the same
/// overlay.
///
/// # Examples
///
/// ```rust
/// use overlay_config::prelude::*;
/// use serde_json::json;
///
/// let shared = SharedOverlayConfig::new(OverlayConfig::empty());
/// shared.update(|config| config.set("port", 8080));
///
/// assert_eq!(shared.get("port"), Some(json!(8080)));
/// ```
#[derive(Debug, Clone)]
pub struct SharedOverlayConfig {
    current: Arc<ArcSwap<OverlayConfig>>,
}

impl SharedOverlayConfig {
    /// Wrap an overlay for shared access.
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// A reference-counted snapshot of the current overlay.
    ///
    /// The snapshot does not change when the handle is updated later.
    pub fn snapshot(&self) -> Arc<OverlayConfig> {
        self.current.load_full()
    }

    /// A copy of the value of `name` in the current overlay.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.current.load().get(name).cloned()
    }

    /// Whether the current overlay defines `name`.
    pub fn has_key(&self, name: &str) -> bool {
        self.current.load().has_key(name)
    }

    /// Reload the configuration files and swap in the result.
    ///
    /// Files are read once. The swap is applied to whatever overlay is current
    /// at that point, so `<defaults>` values written by a concurrent
    /// [`update`](Self::update) are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed. The current
    /// overlay is kept in that case.
    pub fn reload(&self) -> Result<()> {
        let loaded = self.current.load().load_sources()?;
        self.current.rcu(|current| {
            let mut next = OverlayConfig::clone(current);
            next.replace_loaded(loaded.clone());
            next
        });
        Ok(())
    }

    /// Apply `change` to a copy of the current overlay and swap it in.
    ///
    /// `change` may run more than once if another update races with it.
    pub fn update<F>(&self, mut change: F)
    where
        F: FnMut(&mut OverlayConfig),
    {
        self.current.rcu(|current| {
            let mut next = OverlayConfig::clone(current);
            change(&mut next);
            next
        });
    }
}

impl From<OverlayConfig> for SharedOverlayConfig {
    fn from(config: OverlayConfig) -> Self {
        Self::new(config)
    }
}
