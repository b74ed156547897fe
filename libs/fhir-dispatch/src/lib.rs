//! Typed dispatch from a resource type name to a FHIR model
//!
//! A [`ModelRegistry`] maps resource type names to [`ModelDefinition`]s. A
//! [`ModelDispatcher`] takes an expected type name plus a [`ModelInput`]
//! (text, bytes, file path, mapping or an existing instance), parses it with
//! the registered definition, and checks the result carries the expected
//! `resourceType`.
//!
//! # Example
//!
//! ```rust
//! use ferrum_dispatch::{ErrorKind, ModelDispatcher, ModelRegistry, Resource};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ModelRegistry::builtin().unwrap());
//! let dispatcher = ModelDispatcher::new(registry);
//!
//! let patient = dispatcher
//!     .validate("Patient", r#"{"resourceType": "Patient", "id": "123"}"#)
//!     .unwrap();
//! assert_eq!(patient.id(), Some("123"));
//!
//! let err = dispatcher
//!     .validate("Patient", json!({"resourceType": "Observation", "status": "final"}))
//!     .unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ResourceTypeMismatch);
//! ```

pub mod config;
pub mod definition;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod registry;

pub use config::{
    DispatchConfig, DispatchConfigBuilder, FormatsConfig, LimitsConfig, PassthroughPolicy,
    RegistryConfig,
};
pub use definition::{FileOptions, ModelDefinition, SourceFormat, TypedModel};
pub use dispatcher::{ModelDispatcher, TypeValidator};
pub use error::{
    ConfigError, DispatchError, ErrorKind, ParseFailure, RegistryError, Result, ValidationFailure,
};
pub use input::ModelInput;
pub use registry::{ModelRegistry, ModelRegistryBuilder};

pub use ferrum_models::common::{Resource, ResourceModel};
