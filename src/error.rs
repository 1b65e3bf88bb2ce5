//! Error types for overlay-config.

use crate::sources::Format;
use std::path::PathBuf;

/// Result type alias for overlay-config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration.
///
/// Missing files and unknown extensions are not errors: they are logged and
/// skipped. Lookups never fail either, a miss is reported as `None`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A selected configuration file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    ReadError {
        /// The file that was being read
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A selected configuration file contains malformed content.
    #[error("Failed to parse {} as {format}: {message}", .path.display())]
    ParseError {
        /// The file that failed to parse
        path: PathBuf,
        /// The format the file was parsed as
        format: Format,
        /// Parser diagnostic
        message: String,
    },

    /// A configuration file parsed to something other than a mapping.
    #[error("Configuration file {} does not contain a mapping at the top level", .path.display())]
    NotAMapping {
        /// The offending file
        path: PathBuf,
    },

    /// Failed to deserialize configuration values into a typed structure.
    #[error("Failed to deserialize configuration: {0}")]
    DeserializationError(String),

    /// Attempted to use a format whose cargo feature is not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(&'static str),

    /// Failed to load configuration for another reason.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),
}
