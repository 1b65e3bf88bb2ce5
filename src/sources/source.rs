//! A single configuration layer.

use crate::Mapping;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Label of the synthetic source that holds programmatic defaults.
pub const DEFAULTS_LABEL: &str = "<defaults>";

/// One configuration layer: a label plus its parsed top-level mapping.
///
/// The label is either the path of the file the content was read from or a
/// bracketed marker such as `<defaults>` for sources injected in code.
///
/// The content sits behind an [`Arc`], so cloning a `Source` (and therefore
/// cloning an [`OverlayConfig`](crate::core::OverlayConfig)) shares the
/// mapping instead of copying it. Writes go through [`Arc::make_mut`], which
/// copies a shared mapping before touching it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    label: String,
    content: Arc<Mapping>,
}

impl Source {
    /// Create a source from a label and its content.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use overlay_config::{Mapping, sources::Source};
    ///
    /// let source = Source::new("<inline>", Mapping::new());
    /// assert!(source.is_synthetic());
    /// ```
    pub fn new(label: impl Into<String>, content: impl Into<Arc<Mapping>>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }

    /// Create a source labeled with the path it was loaded from.
    pub fn from_file(path: &Path, content: Mapping) -> Self {
        Self::new(path.display().to_string(), content)
    }

    /// The file path or synthetic marker identifying this source.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The parsed top-level mapping.
    pub fn content(&self) -> &Mapping {
        &self.content
    }

    /// Mutable access to the mapping, copying it first if it is shared.
    pub(crate) fn content_mut(&mut self) -> &mut Mapping {
        Arc::make_mut(&mut self.content)
    }

    /// Whether this source was injected in code rather than read from a file.
    pub fn is_synthetic(&self) -> bool {
        self.label.starts_with('<') && self.label.ends_with('>')
    }

    /// Whether this is the `<defaults>` source.
    pub fn is_defaults(&self) -> bool {
        self.label == DEFAULTS_LABEL
    }

    /// Split the source into its label and content.
    pub fn into_parts(self) -> (String, Arc<Mapping>) {
        (self.label, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: serde_json::Value) -> Mapping {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_synthetic_labels() {
        assert!(Source::new(DEFAULTS_LABEL, Mapping::new()).is_synthetic());
        assert!(Source::new("<append_test>", Mapping::new()).is_synthetic());
        assert!(!Source::new("/etc/app/config.json", Mapping::new()).is_synthetic());
    }

    #[test]
    fn test_is_defaults() {
        assert!(Source::new(DEFAULTS_LABEL, Mapping::new()).is_defaults());
        assert!(!Source::new("<other>", Mapping::new()).is_defaults());
    }

    #[test]
    fn test_from_file_uses_path_as_label() {
        let source = Source::from_file(Path::new("/tmp/data/config.json"), Mapping::new());
        assert_eq!(source.label(), "/tmp/data/config.json");
    }

    #[test]
    fn test_clone_shares_until_written() {
        let original = Source::new("<a>", mapping(json!({"key": "value"})));
        let mut copy = original.clone();
        assert!(Arc::ptr_eq(&original.content, &copy.content));

        copy.content_mut().insert("key".into(), json!("changed"));
        assert_eq!(original.content()["key"], json!("value"));
        assert_eq!(copy.content()["key"], json!("changed"));
    }

    #[test]
    fn test_serialize() {
        let source = Source::new("<a>", mapping(json!({"key": 1})));
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value, json!({"label": "<a>", "content": {"key": 1}}));
    }
}
