//! # overlay-config
//!
//! Layered configuration loading with first-match-wins lookups.
//!
//! ## Overview
//!
//! `overlay-config` searches a list of base directories for configuration
//! files, parses them as YAML, JSON or TOML, and stacks them into an overlay:
//! - Files are discovered at `base_directory/scope/filename`, base directories
//!   first, then filenames
//! - Filenames may be glob patterns (`conf.d/*.yml`), expanded in sorted order
//! - Lookups scan the stack from the top and return the first match
//! - Programmatic defaults sit at the bottom of the stack
//!
//! Missing files are skipped with a debug log and files with an unknown
//! extension with a warning. Malformed files abort loading.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use overlay_config::prelude::*;
//! use serde_json::json;
//!
//! # fn example() -> Result<()> {
//! let config = OverlayConfig::builder()
//!     .with_scope("myapp")
//!     .with_filenames(["config.yml", "conf.d/*.yml"])
//!     .with_base_directories(["~/.config", "/etc"])
//!     .with_default("listen", "127.0.0.1:8080")
//!     .build()?;
//!
//! println!("listening on {}", config["listen"]);
//! println!("db host: {:?}", config.get_path(&["database", "host"]));
//! println!("loaded: {:?}", config.labels());
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Discovery events are emitted with `tracing`. Install a subscriber to see
//! them; without one they are dropped.
//!
//! ## Feature Flags
//!
//! - `yaml` (default): YAML files via `serde_yaml`
//! - `toml`: TOML files via `toml`
//! - `all-formats`: both of the above
//!
//! JSON support is always enabled.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod sources;

pub use serde_json::Value;

/// A parsed mapping with string keys.
pub type Mapping = serde_json::Map<String, Value>;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{Key, NestedLookup, OverlayConfig, OverlayConfigBuilder, SharedOverlayConfig};
    pub use crate::error::{ConfigError, Result};
    pub use crate::sources::{Format, Source};
    pub use crate::{Mapping, Value};
}
