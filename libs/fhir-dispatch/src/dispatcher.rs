use crate::config::{DispatchConfig, PassthroughPolicy};
use crate::definition::{FileOptions, ModelDefinition};
use crate::error::{ConfigError, DispatchError, Result, ValidationFailure};
use crate::input::ModelInput;
use crate::registry::ModelRegistry;
use ferrum_models::common::{Resource, ResourceModel};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Parses arbitrary input into the model registered for an expected
/// resource type and enforces the `resourceType` tag.
///
/// Cheap to clone; the registry is shared.
#[derive(Debug, Clone)]
pub struct ModelDispatcher {
    registry: Arc<ModelRegistry>,
    config: DispatchConfig,
}

/// Outcome of the shape dispatch, before any checks
enum Dispatched {
    Parsed(Box<dyn Resource>),
    Passthrough(Box<dyn Resource>),
    Unrecognized(Value),
}

impl ModelDispatcher {
    /// Dispatcher with the default configuration
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            config: DispatchConfig::default(),
        }
    }

    pub fn with_config(
        registry: Arc<ModelRegistry>,
        config: DispatchConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    /// Dispatcher over the built-in models, namespaced per `config`
    pub fn builtin(config: DispatchConfig) -> std::result::Result<Self, ConfigError> {
        let registry = ModelRegistry::builder()
            .namespace(config.registry.namespace.clone())
            .with_builtin_models()
            .build()?;
        Self::with_config(Arc::new(registry), config)
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn resolve(&self, type_name: &str) -> Result<Arc<dyn ModelDefinition>> {
        self.registry.resolve(type_name)
    }

    /// Parse `input` into a model of type `expected` and check its tag.
    pub fn validate(
        &self,
        expected: &str,
        input: impl Into<ModelInput>,
    ) -> Result<Box<dyn Resource>> {
        let definition = self.registry.resolve(expected)?;
        let input = input.into();
        debug!(resource_type = expected, shape = input.shape(), "dispatching model input");

        let dispatched = match input {
            ModelInput::Text(text) => Dispatched::Parsed(definition.parse_str(&text)?),
            ModelInput::Bytes(bytes) => Dispatched::Parsed(definition.parse_bytes(&bytes)?),
            ModelInput::Path(path) => {
                Dispatched::Parsed(definition.parse_file(&path, &self.file_options())?)
            }
            ModelInput::Mapping(mapping) => Dispatched::Parsed(definition.parse_mapping(mapping)?),
            ModelInput::Instance(instance) => Dispatched::Passthrough(instance),
            ModelInput::Value(value) => Dispatched::Unrecognized(value),
        };

        let (instance, passthrough) = match dispatched {
            Dispatched::Parsed(instance) => (instance, false),
            Dispatched::Passthrough(instance) => (instance, true),
            Dispatched::Unrecognized(value) => {
                warn!(resource_type = expected, "input is not a model instance");
                return Err(DispatchError::NotAModel {
                    expected: expected.to_string(),
                    found: describe_value(&value).to_string(),
                });
            }
        };

        if instance.resource_type() != expected {
            warn!(
                expected,
                found = instance.resource_type(),
                "resourceType mismatch"
            );
            return Err(ValidationFailure::ResourceTypeMismatch {
                expected: expected.to_string(),
                found: instance.resource_type().to_string(),
            }
            .into());
        }

        if passthrough
            && self.config.passthrough == PassthroughPolicy::Strict
            && !definition.owns(instance.as_ref())
        {
            warn!(resource_type = expected, "instance is not of the registered model type");
            return Err(DispatchError::NotAModel {
                expected: expected.to_string(),
                found: format!("an instance of another model tagged {}", expected),
            });
        }

        Ok(instance)
    }

    /// Typed variant of [`validate`](Self::validate) using `T::RESOURCE_TYPE`
    pub fn validate_as<T: ResourceModel>(&self, input: impl Into<ModelInput>) -> Result<T> {
        let instance = self.validate(T::RESOURCE_TYPE, input)?;
        let found = instance.resource_type().to_string();
        instance
            .downcast::<T>()
            .map(|model| *model)
            .ok_or_else(|| DispatchError::NotAModel {
                expected: T::RESOURCE_TYPE.to_string(),
                found: format!("an instance of another model tagged {found}"),
            })
    }

    /// Validate every input independently; one result per input
    pub fn validate_batch<I>(&self, expected: &str, inputs: I) -> Vec<Result<Box<dyn Resource>>>
    where
        I: IntoIterator,
        I::Item: Into<ModelInput>,
    {
        inputs
            .into_iter()
            .map(|input| self.validate(expected, input))
            .collect()
    }

    /// A validator bound to one expected resource type
    pub fn validator_for(&self, expected: impl Into<String>) -> TypeValidator {
        TypeValidator {
            dispatcher: self.clone(),
            resource_type: expected.into(),
        }
    }

    fn file_options(&self) -> FileOptions {
        FileOptions {
            max_bytes: self.config.limits.max_file_bytes,
            yaml: self.config.formats.yaml,
        }
    }
}

/// Per-type validator, the expected name fixed at construction
#[derive(Debug, Clone)]
pub struct TypeValidator {
    dispatcher: ModelDispatcher,
    resource_type: String,
}

impl TypeValidator {
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn validate(&self, input: impl Into<ModelInput>) -> Result<Box<dyn Resource>> {
        self.dispatcher.validate(&self.resource_type, input)
    }
}

fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a JSON string value",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ferrum_models::common::{Observation, Patient};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    fn dispatcher() -> ModelDispatcher {
        ModelDispatcher::new(Arc::new(ModelRegistry::builtin().unwrap()))
    }

    /// A second model that claims the Patient tag
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ShadowPatient {
        resource_type: String,
        id: Option<String>,
    }

    impl Resource for ShadowPatient {
        fn resource_type(&self) -> &str {
            &self.resource_type
        }

        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn to_value(&self) -> ferrum_models::Result<Value> {
            Ok(serde_json::to_value(self)?)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
            self
        }

        fn clone_box(&self) -> Box<dyn Resource> {
            Box::new(self.clone())
        }
    }

    fn shadow() -> ShadowPatient {
        ShadowPatient {
            resource_type: "Patient".to_string(),
            id: Some("s1".to_string()),
        }
    }

    #[test]
    fn test_text_input() {
        let patient = dispatcher()
            .validate("Patient", r#"{"resourceType": "Patient", "id": "t1"}"#)
            .unwrap();
        assert_eq!(patient.id(), Some("t1"));
    }

    #[test]
    fn test_unknown_type_fails_before_parsing() {
        let err = dispatcher().validate("Encounter", "{not valid json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LookupMiss);
    }

    #[test]
    fn test_unrecognized_value_is_not_a_model() {
        let err = dispatcher().validate("Patient", json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAModel);
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_passthrough_tag_mismatch() {
        let obs = Observation::from_value(json!({"status": "final", "code": {"text": "x"}}))
            .unwrap();
        let err = dispatcher()
            .validate("Patient", ModelInput::instance(obs))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceTypeMismatch);
    }

    #[test]
    fn test_strict_passthrough_rejects_foreign_model() {
        let err = dispatcher()
            .validate("Patient", ModelInput::instance(shadow()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAModel);
    }

    #[test]
    fn test_capability_passthrough_accepts_foreign_model() {
        let config = DispatchConfig::builder()
            .passthrough(PassthroughPolicy::Capability)
            .build();
        let dispatcher =
            ModelDispatcher::with_config(Arc::new(ModelRegistry::builtin().unwrap()), config)
                .unwrap();

        let instance = dispatcher
            .validate("Patient", ModelInput::instance(shadow()))
            .unwrap();
        assert!(instance.is::<ShadowPatient>());

        // the typed accessor still refuses to hand out the wrong type
        let err = dispatcher
            .validate_as::<Patient>(ModelInput::instance(shadow()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAModel);
    }

    #[test]
    fn test_validate_as() {
        let patient: Patient = dispatcher()
            .validate_as(json!({"resourceType": "Patient", "active": false}))
            .unwrap();
        assert_eq!(patient.active, Some(false));
    }

    #[test]
    fn test_validator_for() {
        let validator = dispatcher().validator_for("Observation");
        assert_eq!(validator.resource_type(), "Observation");

        let obs = validator
            .validate(json!({"resourceType": "Observation", "status": "final", "code": {"text": "x"}}))
            .unwrap();
        assert_eq!(obs.resource_type(), "Observation");

        let err = validator.validate(json!({"resourceType": "Patient"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFields);
    }

    #[test]
    fn test_validate_batch_keeps_going() {
        let results = dispatcher().validate_batch(
            "Patient",
            vec![
                r#"{"resourceType": "Patient", "id": "a"}"#,
                "{not valid json",
                r#"{"resourceType": "Patient", "id": "c"}"#,
            ],
        );

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert_eq!(results[1].as_ref().unwrap_err().kind(), ErrorKind::ParseContent);
        assert_eq!(results[2].as_ref().unwrap().id(), Some("c"));
    }

    #[test]
    fn test_builtin_rejects_invalid_config() {
        let config = DispatchConfig::builder().max_file_bytes(0).build();
        assert!(ModelDispatcher::builtin(config).is_err());
    }
}
