//! FHIR data models
//!
//! This crate provides strongly-typed Rust structures for FHIR resources.
//!
//! # Module Organization
//!
//! - `common`: Version-agnostic models that work across FHIR R4, R4B, and R5
//!
//! Every resource model implements [`Resource`], the object-safe capability
//! set (type tag, id, JSON conversion, downcasting), and [`ResourceModel`],
//! which carries the declared type name and the serde bounds.
//!
//! # Example
//!
//! ```rust
//! use ferrum_models::common::{AdministrativeGender, Patient, Resource, ResourceModel};
//! use serde_json::json;
//!
//! let patient = Patient::from_value(json!({
//!     "resourceType": "Patient",
//!     "id": "example",
//!     "gender": "female"
//! }))
//! .unwrap();
//!
//! assert_eq!(patient.resource_type(), Patient::RESOURCE_TYPE);
//! assert_eq!(patient.gender, Some(AdministrativeGender::Female));
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
