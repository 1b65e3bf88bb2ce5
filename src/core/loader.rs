//! Configuration loader that discovers and parses configuration files.

use crate::error::{ConfigError, Result};
use crate::sources::{Format, Source, candidate_path, expand_glob, has_glob_meta};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Discovers configuration files and parses them into sources.
///
/// Candidates are built as `base_directory/scope/filename`, iterating base
/// directories in the outer loop and filenames in the inner loop, so every
/// filename is tried in one base directory before moving to the next.
#[derive(Debug, Clone)]
pub(crate) struct ConfigLoader {
    scope: String,
    filenames: Vec<String>,
    base_directories: Vec<PathBuf>,
    default_parser: Option<Format>,
}

impl ConfigLoader {
    /// Create a loader for the given search space.
    pub fn new(
        scope: String,
        filenames: Vec<String>,
        base_directories: Vec<PathBuf>,
        default_parser: Option<Format>,
    ) -> Self {
        Self {
            scope,
            filenames,
            base_directories,
            default_parser,
        }
    }

    /// A loader that searches nowhere.
    pub fn empty() -> Self {
        Self::new(String::new(), Vec::new(), Vec::new(), None)
    }

    /// Find every configuration file in priority order.
    ///
    /// A candidate that exists as a file is used as is. Otherwise it is
    /// expanded as a glob and its matches are used in sorted order. Candidates
    /// with neither are logged at debug level and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a candidate path cannot be made absolute.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for base_directory in &self.base_directories {
            for filename in &self.filenames {
                let candidate = candidate_path(base_directory, &self.scope, filename)?;

                if candidate.is_file() {
                    files.push(candidate);
                    continue;
                }

                let matches = if has_glob_meta(&candidate.to_string_lossy()) {
                    expand_glob(&candidate).unwrap_or_else(|e| {
                        warn!("ignoring {}, invalid glob pattern: {}", candidate.display(), e);
                        Vec::new()
                    })
                } else {
                    Vec::new()
                };

                if matches.is_empty() {
                    debug!("{} not found, ignoring it.", candidate.display());
                } else {
                    files.extend(matches);
                }
            }
        }

        Ok(files)
    }

    /// Discover and parse every configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected file cannot be read or parsed. No
    /// partial result is returned in that case.
    pub fn load(&self) -> Result<Vec<Source>> {
        let mut sources = Vec::new();
        for path in self.discover()? {
            if let Some(source) = self.load_file(&path)? {
                sources.push(source);
            }
        }
        Ok(sources)
    }

    /// Parse a single file, choosing the format from its extension or the
    /// default parser.
    ///
    /// Returns `Ok(None)` and logs a warning when no format applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is malformed.
    pub fn load_file(&self, path: &Path) -> Result<Option<Source>> {
        let Some(format) = Format::select(path, self.default_parser) else {
            warn!("ignoring {}, file extension not known.", path.display());
            return Ok(None);
        };

        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let content = format.parse(path, &text)?;

        debug!(format = %format, keys = content.len(), "loaded {}", path.display());
        Ok(Some(Source::from_file(path, content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn loader(base_directories: Vec<PathBuf>, filenames: &[&str]) -> ConfigLoader {
        ConfigLoader::new(
            "data".to_string(),
            filenames.iter().map(|f| f.to_string()).collect(),
            base_directories,
            None,
        )
    }

    #[test]
    fn test_empty_loader() {
        let loader = ConfigLoader::empty();
        assert!(loader.load().unwrap().is_empty());
    }

    #[test]
    fn test_discover_base_directories_outer_filenames_inner() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        for dir in [first.path(), second.path()] {
            write(&dir.join("data/config.json"), "{}");
            write(&dir.join("data/credentials.json"), "{}");
        }

        let loader = loader(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            &["config.json", "credentials.json"],
        );
        let files = loader.discover().unwrap();
        assert_eq!(
            files,
            vec![
                first.path().join("data/config.json"),
                first.path().join("data/credentials.json"),
                second.path().join("data/config.json"),
                second.path().join("data/credentials.json"),
            ]
        );
    }

    #[test]
    fn test_discover_skips_missing() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir.path().join("data/credentials.json"), "{}");

        let loader = loader(
            vec![temp_dir.path().to_path_buf()],
            &["config.json", "credentials.json"],
        );
        assert_eq!(
            loader.discover().unwrap(),
            vec![temp_dir.path().join("data/credentials.json")]
        );
    }

    #[test]
    fn test_discover_literal_file_with_glob_characters() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir.path().join("data/[literal].json"), "{}");

        let loader = loader(vec![temp_dir.path().to_path_buf()], &["[literal].json"]);
        assert_eq!(
            loader.discover().unwrap(),
            vec![temp_dir.path().join("data/[literal].json")]
        );
    }

    #[test]
    fn test_discover_invalid_glob_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let loader = loader(vec![temp_dir.path().to_path_buf()], &["[broken.json"]);
        assert!(loader.discover().unwrap().is_empty());
    }

    #[test]
    fn test_load_file_unknown_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("unsupported.cfg");
        write(&path, "with_default_parser: it works\n");

        let loader = ConfigLoader::empty();
        assert!(loader.load_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_file_default_parser() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("unsupported.cfg");
        write(&path, r#"{"with_default_parser": "it works"}"#);

        let loader = ConfigLoader::new(String::new(), Vec::new(), Vec::new(), Some(Format::Json));
        let source = loader.load_file(&path).unwrap().unwrap();
        assert_eq!(source.content()["with_default_parser"], json!("it works"));
        assert_eq!(source.label(), path.display().to_string());
    }

    #[test]
    fn test_load_file_wrong_default_parser_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("unsupported.cfg");
        write(&path, "with_default_parser: it works\n");

        let loader = ConfigLoader::new(String::new(), Vec::new(), Vec::new(), Some(Format::Json));
        let err = loader.load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_load_file_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::empty();
        let err = loader
            .load_file(&temp_dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_load_stops_on_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir.path().join("data/config.json"), "{broken");
        write(&temp_dir.path().join("data/credentials.json"), "{}");

        let loader = loader(
            vec![temp_dir.path().to_path_buf()],
            &["config.json", "credentials.json"],
        );
        assert!(loader.load().is_err());
    }
}
