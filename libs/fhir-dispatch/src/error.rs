//! Error types for model dispatch

use serde_json::{json, Value};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Failure of a resolve or validate call
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No definition is registered under the name
    #[error("'{qualified_name}' not found. Should be registered from '{hint}'")]
    NotFound {
        type_name: String,
        qualified_name: String,
        hint: String,
    },

    #[error("failed to parse {resource_type}: {source}")]
    Parse {
        resource_type: String,
        #[source]
        source: ParseFailure,
    },

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The value handed through is not a model instance of the expected kind
    #[error("expected a {expected} model instance, got {found}")]
    NotAModel { expected: String, found: String },
}

/// Why raw input could not be turned into a document
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, limit is {limit}", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("malformed JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("malformed YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),

    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl ParseFailure {
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::TooLarge { .. })
    }
}

#[derive(Debug, Error)]
pub enum ValidationFailure {
    /// The document does not fit the model: missing or mistyped fields
    #[error("invalid {resource_type}: {message}")]
    InvalidFields {
        resource_type: String,
        message: String,
    },

    #[error("resourceType mismatch: expected {expected}, found {found}")]
    ResourceTypeMismatch { expected: String, found: String },
}

/// Discriminator over [`DispatchError`] for callers that branch on the cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    LookupMiss,
    ParseIo,
    ParseContent,
    InvalidFields,
    ResourceTypeMismatch,
    NotAModel,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LookupMiss => "lookup-miss",
            Self::ParseIo => "parse-io",
            Self::ParseContent => "parse-content",
            Self::InvalidFields => "invalid-fields",
            Self::ResourceTypeMismatch => "resource-type-mismatch",
            Self::NotAModel => "not-a-model",
        };
        write!(f, "{}", s)
    }
}

impl DispatchError {
    pub(crate) fn not_found(namespace: &str, type_name: &str) -> Self {
        Self::NotFound {
            type_name: type_name.to_string(),
            qualified_name: format!("{}.{}", namespace, type_name),
            hint: format!("{}.{}", type_name.to_lowercase(), type_name),
        }
    }

    pub(crate) fn parse(resource_type: &str, source: ParseFailure) -> Self {
        Self::Parse {
            resource_type: resource_type.to_string(),
            source,
        }
    }

    pub(crate) fn invalid_fields(resource_type: &str, message: impl fmt::Display) -> Self {
        Self::Validation(ValidationFailure::InvalidFields {
            resource_type: resource_type.to_string(),
            message: message.to_string(),
        })
    }

    /// Map a serde_json failure: syntax and EOF are parse errors, data errors
    /// mean the document was well-formed but did not fit the model.
    pub(crate) fn from_json(resource_type: &str, err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Data => Self::invalid_fields(resource_type, err),
            Category::Io | Category::Syntax | Category::Eof => {
                Self::parse(resource_type, ParseFailure::Json(err))
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::LookupMiss,
            Self::Parse { source, .. } if source.is_io() => ErrorKind::ParseIo,
            Self::Parse { .. } => ErrorKind::ParseContent,
            Self::Validation(ValidationFailure::InvalidFields { .. }) => ErrorKind::InvalidFields,
            Self::Validation(ValidationFailure::ResourceTypeMismatch { .. }) => {
                ErrorKind::ResourceTypeMismatch
            }
            Self::NotAModel { .. } => ErrorKind::NotAModel,
        }
    }

    /// FHIR issue type code for this failure
    fn issue_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::LookupMiss => "not-found",
            ErrorKind::ParseIo => "exception",
            ErrorKind::ParseContent => "structure",
            ErrorKind::InvalidFields | ErrorKind::ResourceTypeMismatch => "invalid",
            ErrorKind::NotAModel => "processing",
        }
    }

    /// Render as a single-issue OperationOutcome resource
    pub fn to_operation_outcome(&self) -> Value {
        json!({
            "resourceType": "OperationOutcome",
            "issue": [{
                "severity": "error",
                "code": self.issue_code(),
                "diagnostics": self.to_string(),
            }]
        })
    }
}

/// Failure while assembling a [`crate::ModelRegistry`]
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate model definition for resource type {0}")]
    DuplicateDefinition(String),

    #[error("model definition has an empty resource type name")]
    EmptyTypeName,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}
