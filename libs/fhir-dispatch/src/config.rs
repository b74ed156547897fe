use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Default namespace reported in lookup-miss diagnostics
pub const DEFAULT_NAMESPACE: &str = "ferrum_models";

/// 16 MiB
pub const DEFAULT_MAX_FILE_BYTES: u64 = 16 * 1024 * 1024;

/// Dispatcher configuration
///
/// Every section has defaults, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    pub registry: RegistryConfig,
    pub formats: FormatsConfig,
    pub limits: LimitsConfig,
    pub passthrough: PassthroughPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Namespace used to qualify type names in lookup errors
    pub namespace: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatsConfig {
    /// Parse `.yaml` / `.yml` files as YAML instead of JSON
    pub yaml: bool,
}

impl Default for FormatsConfig {
    fn default() -> Self {
        Self { yaml: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Files larger than this are rejected before reading
    pub max_file_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// How an already-built instance handed to the dispatcher is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PassthroughPolicy {
    /// The instance must be of the exact model type registered for the
    /// expected name.
    #[default]
    Strict,
    /// Any resource model with a matching tag is accepted.
    Capability,
}

impl DispatchConfig {
    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.namespace.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "registry.namespace must not be empty".to_string(),
            ));
        }

        if self.limits.max_file_bytes == 0 {
            return Err(ConfigError::InvalidConfig(
                "limits.max_file_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DispatchConfigBuilder {
    config: DispatchConfig,
}

impl DispatchConfigBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.registry.namespace = namespace.into();
        self
    }

    pub fn yaml(mut self, enabled: bool) -> Self {
        self.config.formats.yaml = enabled;
        self
    }

    pub fn max_file_bytes(mut self, limit: u64) -> Self {
        self.config.limits.max_file_bytes = limit;
        self
    }

    pub fn passthrough(mut self, policy: PassthroughPolicy) -> Self {
        self.config.passthrough = policy;
        self
    }

    pub fn build(self) -> DispatchConfig {
        self.config
    }
}
