//! Configuration file formats and parse dispatch.

use crate::Mapping;
use crate::error::{ConfigError, Result};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A configuration file format.
///
/// The format of a file is chosen from its extension:
/// - `.yaml`, `.yml` -> YAML
/// - `.json` -> JSON
/// - `.toml` -> TOML
///
/// A default parser can be configured for files whose extension is not one of
/// the above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// YAML (requires the `yaml` feature)
    Yaml,
    /// JSON
    Json,
    /// TOML (requires the `toml` feature)
    Toml,
}

impl Format {
    /// Detect the format from a file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str())? {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// Choose the parser for `path`.
    ///
    /// A recognized extension selects its own format and the `default_parser`
    /// applies to every other file. The one exception is a default parser of
    /// YAML, which also takes over `.json` files.
    pub fn select(path: &Path, default_parser: Option<Format>) -> Option<Self> {
        match (Self::from_extension(path), default_parser) {
            (Some(Format::Json), Some(Format::Yaml)) => Some(Format::Yaml),
            (Some(detected), _) => Some(detected),
            (None, default_parser) => default_parser,
        }
    }

    /// Parse `text` read from `path` into a top-level mapping.
    ///
    /// Blank input and documents that are `null` yield an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed, if the document is not a
    /// mapping, or if the format's cargo feature is disabled.
    pub fn parse(self, path: &Path, text: &str) -> Result<Mapping> {
        if text.trim().is_empty() {
            return Ok(Mapping::new());
        }

        let value = match self {
            Format::Yaml => parse_yaml(text),
            Format::Json => {
                serde_json::from_str::<Value>(text).map_err(|e| ParseFailure::from(e.to_string()))
            }
            Format::Toml => parse_toml(text),
        }
        .map_err(|failure| match failure {
            ParseFailure::Message(message) => ConfigError::ParseError {
                path: path.to_path_buf(),
                format: self,
                message,
            },
            ParseFailure::Disabled(feature) => ConfigError::FeatureNotEnabled(feature),
        })?;

        match value {
            Value::Object(mapping) => Ok(mapping),
            Value::Null => Ok(Mapping::new()),
            _ => Err(ConfigError::NotAMapping {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
            Format::Toml => "toml",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            other => Err(ConfigError::LoadError(format!(
                "Unknown parser: {}. Supported: yaml, json, toml",
                other
            ))),
        }
    }
}

enum ParseFailure {
    Message(String),
    #[allow(dead_code)]
    Disabled(&'static str),
}

impl From<String> for ParseFailure {
    fn from(message: String) -> Self {
        ParseFailure::Message(message)
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml(text: &str) -> std::result::Result<Value, ParseFailure> {
    let mut document: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    document.apply_merge().map_err(|e| e.to_string())?;
    Ok(yaml_to_value(document)?)
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(_text: &str) -> std::result::Result<Value, ParseFailure> {
    Err(ParseFailure::Disabled("yaml"))
}

/// Convert a YAML tree, rendering scalar mapping keys as strings.
#[cfg(feature = "yaml")]
fn yaml_to_value(value: serde_yaml::Value) -> std::result::Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(n.to_string()))
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_value)
                .collect::<std::result::Result<_, _>>()?,
        ),
        Yaml::Mapping(entries) => {
            let mut mapping = Mapping::new();
            for (key, value) in entries {
                mapping.insert(yaml_key(key)?, yaml_to_value(value)?);
            }
            Value::Object(mapping)
        }
        Yaml::Tagged(tagged) => yaml_to_value(tagged.value)?,
    })
}

#[cfg(feature = "yaml")]
fn yaml_key(key: serde_yaml::Value) -> std::result::Result<String, String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}

#[cfg(feature = "toml")]
fn parse_toml(text: &str) -> std::result::Result<Value, ParseFailure> {
    let table: toml::Table = text.parse().map_err(|e: toml::de::Error| e.to_string())?;
    Ok(toml_to_value(toml::Value::Table(table)))
}

#[cfg(not(feature = "toml"))]
fn parse_toml(_text: &str) -> std::result::Result<Value, ParseFailure> {
    Err(ParseFailure::Disabled("toml"))
}

#[cfg(feature = "toml")]
fn toml_to_value(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_value).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_value(value)))
                .collect(),
        ),
    }
}
