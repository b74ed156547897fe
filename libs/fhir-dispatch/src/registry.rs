//! Type registry: resource type name -> model definition
//!
//! Built once through [`ModelRegistryBuilder`] and immutable afterwards, so a
//! registry can be shared across threads behind an `Arc` without locking.

use crate::config::DEFAULT_NAMESPACE;
use crate::definition::{ModelDefinition, TypedModel};
use crate::error::{DispatchError, RegistryError, Result};
use ferrum_models::common::{Bundle, Observation, Patient, ResourceModel};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct ModelRegistry {
    namespace: String,
    definitions: HashMap<String, Arc<dyn ModelDefinition>>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// Registry holding every model shipped in `ferrum-models`
    pub fn builtin() -> std::result::Result<Self, RegistryError> {
        Self::builder().with_builtin_models().build()
    }

    /// Resolve a type name to its definition. Exact, case-sensitive match.
    pub fn resolve(&self, type_name: &str) -> Result<Arc<dyn ModelDefinition>> {
        match self.definitions.get(type_name) {
            Some(definition) => {
                debug!(resource_type = type_name, "resolved model definition");
                Ok(Arc::clone(definition))
            }
            None => {
                debug!(
                    resource_type = type_name,
                    namespace = %self.namespace,
                    "no model definition registered"
                );
                Err(DispatchError::not_found(&self.namespace, type_name))
            }
        }
    }

    /// Lookup without logging or a miss error
    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn ModelDefinition>> {
        self.definitions.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.definitions.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Collects definitions; duplicates are reported by [`build`](Self::build)
pub struct ModelRegistryBuilder {
    namespace: String,
    definitions: Vec<Arc<dyn ModelDefinition>>,
}

impl Default for ModelRegistryBuilder {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            definitions: Vec::new(),
        }
    }
}

impl ModelRegistryBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Register the definition for a concrete model type
    pub fn register<T: ResourceModel>(self) -> Self {
        self.register_definition(Arc::new(TypedModel::<T>::new()))
    }

    pub fn register_definition(mut self, definition: Arc<dyn ModelDefinition>) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_builtin_models(self) -> Self {
        self.register::<Patient>()
            .register::<Observation>()
            .register::<Bundle>()
    }

    pub fn build(self) -> std::result::Result<ModelRegistry, RegistryError> {
        let mut definitions = HashMap::with_capacity(self.definitions.len());

        for definition in self.definitions {
            let name = definition.resource_type().to_string();
            if name.is_empty() {
                return Err(RegistryError::EmptyTypeName);
            }
            if definitions.contains_key(&name) {
                return Err(RegistryError::DuplicateDefinition(name));
            }
            definitions.insert(name, definition);
        }

        debug!(
            count = definitions.len(),
            namespace = %self.namespace,
            "model registry built"
        );

        Ok(ModelRegistry {
            namespace: self.namespace,
            definitions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ferrum_models::common::Resource;
    use serde_json::Value;

    #[derive(Debug)]
    struct Nameless;

    impl ModelDefinition for Nameless {
        fn resource_type(&self) -> &str {
            ""
        }

        fn parse_value(&self, _value: Value) -> Result<Box<dyn Resource>> {
            unimplemented!()
        }

        fn owns(&self, _instance: &dyn Resource) -> bool {
            false
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = ModelRegistry::builtin().unwrap();
        assert_eq!(registry.names(), vec!["Bundle", "Observation", "Patient"]);
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_get_is_silent_lookup() {
        let registry = ModelRegistry::builtin().unwrap();
        let definition = registry.get("Patient").unwrap();
        assert_eq!(definition.resource_type(), "Patient");
        assert!(registry.get("Encounter").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_resolve_declares_same_name() {
        let registry = ModelRegistry::builtin().unwrap();
        for name in registry.names() {
            let definition = registry.resolve(name).unwrap();
            assert_eq!(definition.resource_type(), name);
        }
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let registry = ModelRegistry::builtin().unwrap();
        let err = registry.resolve("patient").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LookupMiss);
        assert!(err.to_string().contains("ferrum_models.patient"));
    }

    #[test]
    fn test_empty_name_is_a_miss() {
        let registry = ModelRegistry::builtin().unwrap();
        assert_eq!(registry.resolve("").unwrap_err().kind(), ErrorKind::LookupMiss);
    }

    #[test]
    fn test_custom_namespace_in_error() {
        let registry = ModelRegistry::builder()
            .namespace("fhir.resources")
            .register::<Patient>()
            .build()
            .unwrap();

        let err = registry.resolve("Encounter").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("fhir.resources.Encounter"));
        assert!(msg.contains("encounter.Encounter"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = ModelRegistry::builder()
            .register::<Patient>()
            .register::<Patient>()
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateDefinition(name) if name == "Patient"));
    }

    #[test]
    fn test_empty_type_name_rejected() {
        let err = ModelRegistry::builder()
            .register_definition(Arc::new(Nameless))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::EmptyTypeName));
    }
}
