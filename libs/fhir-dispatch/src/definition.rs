//! Model definitions: per-resource-type parsing capability
//!
//! A [`ModelDefinition`] knows how to turn each raw input shape into a
//! validated instance of one resource type. [`TypedModel`] provides the
//! definition for any [`ResourceModel`], delegating field validation to the
//! model's own deserializer.

use crate::error::{DispatchError, ParseFailure, Result};
use ferrum_models::common::{Resource, ResourceModel};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;

/// Encoding of a document on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    /// Pick the format from the file extension.
    ///
    /// Anything that is not `.yaml`/`.yml` (or YAML support is off) is JSON.
    pub fn from_path(path: &Path, yaml_enabled: bool) -> Self {
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml && yaml_enabled {
            Self::Yaml
        } else {
            Self::Json
        }
    }
}

/// Options applied when a definition reads a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOptions {
    pub max_bytes: u64,
    pub yaml: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            max_bytes: crate::config::DEFAULT_MAX_FILE_BYTES,
            yaml: true,
        }
    }
}

/// The schema of one resource type and its parsing rules
pub trait ModelDefinition: Send + Sync + fmt::Debug {
    /// Declared resource type name, unique within a registry
    fn resource_type(&self) -> &str;

    /// Build an instance from a parsed JSON document
    fn parse_value(&self, value: Value) -> Result<Box<dyn Resource>>;

    /// True if `instance` is of the concrete type this definition produces
    fn owns(&self, instance: &dyn Resource) -> bool;

    /// Parse the native JSON encoding
    fn parse_str(&self, input: &str) -> Result<Box<dyn Resource>> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| DispatchError::parse(self.resource_type(), ParseFailure::Json(e)))?;
        self.parse_value(value)
    }

    fn parse_bytes(&self, input: &[u8]) -> Result<Box<dyn Resource>> {
        let text = std::str::from_utf8(input)
            .map_err(|e| DispatchError::parse(self.resource_type(), ParseFailure::Utf8(e)))?;
        self.parse_str(text)
    }

    fn parse_yaml(&self, input: &str) -> Result<Box<dyn Resource>> {
        let value: Value = serde_yaml::from_str(input)
            .map_err(|e| DispatchError::parse(self.resource_type(), ParseFailure::Yaml(e)))?;
        self.parse_value(value)
    }

    fn parse_mapping(&self, mapping: Map<String, Value>) -> Result<Box<dyn Resource>> {
        self.parse_value(Value::Object(mapping))
    }

    /// Read `path` and parse it in the format its extension names
    fn parse_file(&self, path: &Path, options: &FileOptions) -> Result<Box<dyn Resource>> {
        let io_error = |source| {
            DispatchError::parse(
                self.resource_type(),
                ParseFailure::Io {
                    path: path.to_path_buf(),
                    source,
                },
            )
        };

        let too_large = |size| {
            DispatchError::parse(
                self.resource_type(),
                ParseFailure::TooLarge {
                    path: path.to_path_buf(),
                    size,
                    limit: options.max_bytes,
                },
            )
        };

        let file = File::open(path).map_err(io_error)?;
        let reported = file.metadata().map_err(io_error)?.len();
        if reported > options.max_bytes {
            return Err(too_large(reported));
        }

        // Metadata lengths are zero for pipes and procfs entries, so the read
        // itself is bounded to one byte past the limit.
        let mut bytes = Vec::new();
        file.take(options.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(io_error)?;
        if bytes.len() as u64 > options.max_bytes {
            return Err(too_large(bytes.len() as u64));
        }

        match SourceFormat::from_path(path, options.yaml) {
            SourceFormat::Json => self.parse_bytes(&bytes),
            SourceFormat::Yaml => {
                let text = std::str::from_utf8(&bytes).map_err(|e| {
                    DispatchError::parse(self.resource_type(), ParseFailure::Utf8(e))
                })?;
                self.parse_yaml(text)
            }
        }
    }
}

/// Definition backed by a concrete model type
pub struct TypedModel<T> {
    _model: PhantomData<fn() -> T>,
}

impl<T: ResourceModel> TypedModel<T> {
    pub fn new() -> Self {
        Self {
            _model: PhantomData,
        }
    }
}

impl<T: ResourceModel> Default for TypedModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ResourceModel> fmt::Debug for TypedModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedModel")
            .field("resource_type", &T::RESOURCE_TYPE)
            .finish()
    }
}

impl<T: ResourceModel> ModelDefinition for TypedModel<T> {
    fn resource_type(&self) -> &str {
        T::RESOURCE_TYPE
    }

    fn parse_value(&self, value: Value) -> Result<Box<dyn Resource>> {
        let model: T = serde_json::from_value(value)
            .map_err(|e| DispatchError::invalid_fields(T::RESOURCE_TYPE, e))?;
        Ok(Box::new(model))
    }

    fn parse_str(&self, input: &str) -> Result<Box<dyn Resource>> {
        let model: T =
            serde_json::from_str(input).map_err(|e| DispatchError::from_json(T::RESOURCE_TYPE, e))?;
        Ok(Box::new(model))
    }

    fn owns(&self, instance: &dyn Resource) -> bool {
        instance.is::<T>()
    }
}
