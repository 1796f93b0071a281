use crate::config::{ConfigError, ConfigSource, ConfigValidator, RangeValidator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Environment variable overriding [`ResolverConfig::max_binding_depth`]
pub const ENV_MAX_BINDING_DEPTH: &str = "ELIF_RESOLVER_MAX_BINDING_DEPTH";

/// Environment variable overriding [`ResolverConfig::detect_cycles`]
pub const ENV_DETECT_CYCLES: &str = "ELIF_RESOLVER_DETECT_CYCLES";

/// Configuration trait shared by the resolver's configuration types
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Tuning knobs for the class resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of binding hops (`A -> B -> C`) followed by one resolution
    pub max_binding_depth: usize,
    /// Fail with a circular dependency error instead of recursing without bound
    pub detect_cycles: bool,
}

impl ResolverConfig {
    pub const DEFAULT_MAX_BINDING_DEPTH: usize = 64;

    /// Upper limit accepted by validation; deeper chains would exhaust the call stack first
    pub const MAX_BINDING_DEPTH_LIMIT: usize = 4096;

    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            max_binding_depth: Self::DEFAULT_MAX_BINDING_DEPTH,
            detect_cycles: true,
        }
    }

    /// Set the binding hop limit
    pub fn with_max_binding_depth(mut self, depth: usize) -> Self {
        self.max_binding_depth = depth;
        self
    }

    /// Enable or disable build stack cycle detection
    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(ConfigError::parsing_error(format!(
                "unsupported configuration file '{}', expected .yaml, .yml or .json",
                path.display()
            ))),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfigTrait for ResolverConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(depth_str) = env::var(ENV_MAX_BINDING_DEPTH) {
            config.max_binding_depth =
                depth_str
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: "max_binding_depth".to_string(),
                        value: depth_str.clone(),
                        expected: "positive integer".to_string(),
                    })?;
        }

        if let Ok(detect_str) = env::var(ENV_DETECT_CYCLES) {
            config.detect_cycles = parse_bool("detect_cycles", &detect_str)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        RangeValidator {
            min: 1,
            max: Self::MAX_BINDING_DEPTH_LIMIT,
        }
        .validate("max_binding_depth", &self.max_binding_depth)
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        HashMap::from([
            (
                "max_binding_depth".to_string(),
                ConfigSource::env_or_default(ENV_MAX_BINDING_DEPTH, Self::DEFAULT_MAX_BINDING_DEPTH),
            ),
            (
                "detect_cycles".to_string(),
                ConfigSource::env_or_default(ENV_DETECT_CYCLES, true),
            ),
        ])
    }
}

pub(crate) fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(
            field,
            value,
            "boolean (true/false, 1/0, yes/no, on/off)",
        )),
    }
}
