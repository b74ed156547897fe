//! Capability set shared by every resource model
//!
//! `Resource` is object safe so heterogeneous instances can travel as
//! `Box<dyn Resource>`. `ResourceModel` adds the static half (type name,
//! serde bounds) implemented by each concrete model.

use super::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::any::Any;
use std::fmt::Debug;

/// A validated in-memory FHIR resource of some type.
pub trait Resource: Debug + Send + Sync + 'static {
    /// The `resourceType` tag carried by this instance.
    fn resource_type(&self) -> &str;

    /// Logical id, if assigned
    fn id(&self) -> Option<&str>;

    /// Convert to a JSON value in the FHIR JSON encoding
    fn to_value(&self) -> Result<Value>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn clone_box(&self) -> Box<dyn Resource>;
}

impl Clone for Box<dyn Resource> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl dyn Resource {
    /// Check whether the concrete type behind this instance is `T`
    pub fn is<T: Resource>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Resource>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Recover the concrete model; `None` on a type miss.
    ///
    /// Check with [`is`](Self::is) first when the instance is still needed
    /// after a miss.
    pub fn downcast<T: Resource>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }

    /// Structural equality through the JSON encoding.
    ///
    /// Works across concrete types; two instances are equal when they
    /// serialize to the same document.
    pub fn same_content(&self, other: &dyn Resource) -> bool {
        match (self.to_value(), other.to_value()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// A concrete resource model with a fixed type name.
pub trait ResourceModel: Resource + Serialize + DeserializeOwned + Clone + PartialEq {
    /// Declared resource type, e.g. `"Patient"`
    const RESOURCE_TYPE: &'static str;

    /// Parse from JSON Value
    fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Parse from a JSON document
    fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(Error::from)
    }

    fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from)
    }

    /// Copy a model out of a type-erased instance
    fn from_resource(resource: &dyn Resource) -> Result<Self> {
        resource.downcast_ref::<Self>().cloned().ok_or_else(|| {
            Error::InvalidResource(format!(
                "expected {}, found {}",
                Self::RESOURCE_TYPE,
                resource.resource_type()
            ))
        })
    }
}

/// Implements [`Resource`] and [`ResourceModel`] for a struct with
/// `resource_type: String` and `id: Option<String>` fields.
macro_rules! resource_model {
    ($model:ty, $name:literal) => {
        impl $crate::common::resource::Resource for $model {
            fn resource_type(&self) -> &str {
                &self.resource_type
            }

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn to_value(&self) -> $crate::common::error::Result<serde_json::Value> {
                serde_json::to_value(self).map_err($crate::common::error::Error::from)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }

            fn clone_box(&self) -> Box<dyn $crate::common::resource::Resource> {
                Box::new(self.clone())
            }
        }

        impl $crate::common::resource::ResourceModel for $model {
            const RESOURCE_TYPE: &'static str = $name;
        }
    };
}
