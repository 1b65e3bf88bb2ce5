//! Core configuration types.

mod builder;
mod loader;
mod lookup;
mod overlay;
mod shared;

pub use builder::{DEFAULT_FILENAMES, DEFAULT_SCOPE, OverlayConfigBuilder};
pub(crate) use loader::ConfigLoader;
pub use lookup::{Key, NestedLookup};
pub use overlay::OverlayConfig;
pub use shared::SharedOverlayConfig;
