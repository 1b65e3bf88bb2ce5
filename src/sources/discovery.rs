//! Locating configuration files on disk.

use crate::error::{ConfigError, Result};
use globset::GlobBuilder;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// The conventional base directories: `$HOME/.config` followed by `/etc`.
///
/// The home directory is resolved when this function is called. If it cannot
/// be determined only `/etc` is returned.
pub fn default_base_directories() -> Vec<PathBuf> {
    let mut directories = Vec::with_capacity(2);
    if let Some(home) = dirs::home_dir() {
        directories.push(home.join(".config"));
    }
    directories.push(PathBuf::from("/etc"));
    directories
}

/// Build the absolute candidate path `base/scope/filename`.
pub(crate) fn candidate_path(base: &Path, scope: &str, filename: &str) -> Result<PathBuf> {
    expand_path(&base.join(scope).join(filename))
}

/// Expand a leading `~`, make the path absolute and drop `.` and `..`.
fn expand_path(path: &Path) -> Result<PathBuf> {
    let path = match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    };

    let absolute = std::path::absolute(&path).map_err(|e| {
        ConfigError::LoadError(format!("Unable to resolve {}: {}", path.display(), e))
    })?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                }
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Whether `text` contains glob metacharacters.
pub(crate) fn has_glob_meta(text: &str) -> bool {
    text.contains(['*', '?', '[', '{'])
}

/// Expand a glob pattern into the regular files it matches, sorted by path.
///
/// `*` and `?` do not match across `/`; `**` matches any number of
/// directories. Only the directories below the longest literal prefix of the
/// pattern are walked. Files and directories whose name starts with `.` are
/// skipped unless a pattern component itself starts with `.`.
///
/// # Errors
///
/// Returns an error if the pattern is not a valid glob.
pub(crate) fn expand_glob(pattern: &Path) -> std::result::Result<Vec<PathBuf>, globset::Error> {
    let mut root = PathBuf::new();
    let mut depth = 0;
    let mut recursive = false;
    let mut include_hidden = false;
    for component in pattern.components() {
        let text = component.as_os_str().to_string_lossy();
        if depth == 0 && !has_glob_meta(&text) {
            root.push(component);
        } else {
            depth += 1;
            recursive |= text.contains("**");
            include_hidden |= text.starts_with('.');
        }
    }

    if depth == 0 {
        return Ok(Vec::new());
    }

    let matcher = GlobBuilder::new(&pattern.to_string_lossy())
        .literal_separator(true)
        .build()?
        .compile_matcher();

    let mut walker = WalkDir::new(&root).min_depth(1).follow_links(true);
    if !recursive {
        walker = walker.max_depth(depth);
    }

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|entry| {
            include_hidden
                || entry.depth() == 0
                || !entry.file_name().to_string_lossy().starts_with('.')
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| matcher.is_match(path))
        .collect();
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_candidate_path_joins_scope() {
        let path = candidate_path(Path::new("/srv"), "data", "config.json").unwrap();
        assert_eq!(path, PathBuf::from("/srv/data/config.json"));
    }

    #[test]
    fn test_candidate_path_normalizes_dots() {
        let path = candidate_path(Path::new("/srv/./app/.."), "data", "config.json").unwrap();
        assert_eq!(path, PathBuf::from("/srv/data/config.json"));
    }

    #[test]
    fn test_candidate_path_is_absolute() {
        let path = candidate_path(Path::new("relative"), "data", "config.json").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("relative/data/config.json"));
    }

    #[test]
    fn test_candidate_path_expands_home() {
        if let Some(home) = dirs::home_dir() {
            let path = candidate_path(Path::new("~/.config"), "app", "config.json").unwrap();
            assert_eq!(path, home.join(".config/app/config.json"));
        }
    }

    #[test]
    fn test_default_base_directories_end_with_etc() {
        let directories = default_base_directories();
        assert_eq!(directories.last(), Some(&PathBuf::from("/etc")));
    }

    #[test]
    fn test_has_glob_meta() {
        assert!(has_glob_meta("conf.d/*.yml"));
        assert!(has_glob_meta("config.{yml,json}"));
        assert!(!has_glob_meta("config.json"));
    }

    #[test]
    fn test_expand_glob_sorted_files_only() {
        let temp_dir = TempDir::new().unwrap();
        let conf_d = temp_dir.path().join("conf.d");
        touch(&conf_d.join("c.yml"));
        touch(&conf_d.join("a.yml"));
        touch(&conf_d.join("b.yml"));
        touch(&conf_d.join("notes.txt"));
        fs::create_dir_all(conf_d.join("dir.yml")).unwrap();

        let files = expand_glob(&conf_d.join("*.yml")).unwrap();
        assert_eq!(
            files,
            vec![conf_d.join("a.yml"), conf_d.join("b.yml"), conf_d.join("c.yml")]
        );
    }

    #[test]
    fn test_expand_glob_skips_hidden_entries() {
        let temp_dir = TempDir::new().unwrap();
        let conf_d = temp_dir.path().join("conf.d");
        touch(&conf_d.join("a.yml"));
        touch(&conf_d.join(".draft.yml"));
        touch(&conf_d.join(".cache/b.yml"));

        assert_eq!(expand_glob(&conf_d.join("*.yml")).unwrap(), vec![conf_d.join("a.yml")]);
        assert_eq!(expand_glob(&conf_d.join("**/*.yml")).unwrap(), vec![conf_d.join("a.yml")]);
    }

    #[test]
    fn test_expand_glob_explicit_dot_pattern_matches_hidden() {
        let temp_dir = TempDir::new().unwrap();
        let conf_d = temp_dir.path().join("conf.d");
        touch(&conf_d.join(".draft.yml"));

        assert_eq!(
            expand_glob(&conf_d.join(".*.yml")).unwrap(),
            vec![conf_d.join(".draft.yml")]
        );
    }

    #[test]
    fn test_expand_glob_star_does_not_cross_directories() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("top.yml"));
        touch(&temp_dir.path().join("nested/deep.yml"));

        let files = expand_glob(&temp_dir.path().join("*.yml")).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("top.yml")]);
    }

    #[test]
    fn test_expand_glob_recursive() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("a/one.yml"));
        touch(&temp_dir.path().join("a/b/two.yml"));

        let files = expand_glob(&temp_dir.path().join("**/*.yml")).unwrap();
        assert_eq!(
            files,
            vec![
                temp_dir.path().join("a/b/two.yml"),
                temp_dir.path().join("a/one.yml"),
            ]
        );
    }

    #[test]
    fn test_expand_glob_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let files = expand_glob(&temp_dir.path().join("missing/*.yml")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_expand_glob_literal_pattern() {
        let temp_dir = TempDir::new().unwrap();
        assert!(expand_glob(&temp_dir.path().join("config.json")).unwrap().is_empty());
    }

    #[test]
    fn test_expand_glob_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        assert!(expand_glob(&temp_dir.path().join("[unclosed.yml")).is_err());
    }
}
