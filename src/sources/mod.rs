//! Configuration sources: the per-layer record, format dispatch and file discovery.

mod discovery;
mod format;
mod source;

pub use discovery::default_base_directories;
pub(crate) use discovery::{candidate_path, expand_glob, has_glob_meta};
pub use format::Format;
pub use source::{DEFAULTS_LABEL, Source};
