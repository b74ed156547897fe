//! Input shapes accepted by the dispatcher

use ferrum_models::common::Resource;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// A value of unknown shape handed to [`crate::ModelDispatcher::validate`].
///
/// Variants are tried in declaration order: text and bytes, then a path,
/// then a mapping, then pass-through.
#[derive(Debug)]
pub enum ModelInput {
    /// Raw document in the native JSON encoding
    Text(String),
    Bytes(Vec<u8>),
    /// File holding a JSON (or YAML) document
    Path(PathBuf),
    /// Already-parsed key/value form
    Mapping(Map<String, Value>),
    /// An already-constructed model instance
    Instance(Box<dyn Resource>),
    /// A JSON value that is none of the above (array, number, bool, null)
    Value(Value),
}

impl ModelInput {
    pub fn instance<R: Resource>(resource: R) -> Self {
        Self::Instance(Box::new(resource))
    }

    /// Short name of the variant, for diagnostics
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Path(_) => "path",
            Self::Mapping(_) => "mapping",
            Self::Instance(_) => "instance",
            Self::Value(_) => "value",
        }
    }
}

impl From<&str> for ModelInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ModelInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&[u8]> for ModelInput {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for ModelInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&Path> for ModelInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ModelInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Map<String, Value>> for ModelInput {
    fn from(mapping: Map<String, Value>) -> Self {
        Self::Mapping(mapping)
    }
}

/// JSON strings are raw documents and objects are mappings; other values
/// stay opaque.
impl From<Value> for ModelInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Object(mapping) => Self::Mapping(mapping),
            other => Self::Value(other),
        }
    }
}

impl From<Box<dyn Resource>> for ModelInput {
    fn from(resource: Box<dyn Resource>) -> Self {
        Self::Instance(resource)
    }
}
