use crate::config::app_config::{parse_bool, AppConfigTrait};
use crate::config::{ConfigError, ConfigSource, ConfigValidator, KeyValidator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

pub const ENV_BIND_CONTAINER: &str = "ELIF_RESOLVER_BIND_CONTAINER";
pub const ENV_MAKE_METHOD: &str = "ELIF_RESOLVER_MAKE_METHOD";
pub const ENV_BIND_METHOD: &str = "ELIF_RESOLVER_BIND_METHOD";
pub const ENV_LISTENER_METHOD: &str = "ELIF_RESOLVER_LISTENER_METHOD";

/// Settings for [`crate::providers::ResolverServiceProvider`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Bind the container itself so it can be resolved and injected
    pub bind_container_instance: bool,
    /// Container key of the `make` entry point
    pub make_method: String,
    /// Container key of the `bind` entry point
    pub bind_method: String,
    /// Container key of the listener registration entry point
    pub listener_method: String,
    /// Extra identifiers that also resolve to the container
    pub container_aliases: Vec<String>,
}

impl ProviderConfig {
    pub const DEFAULT_MAKE_METHOD: &'static str = "make";
    pub const DEFAULT_BIND_METHOD: &'static str = "bind";
    pub const DEFAULT_LISTENER_METHOD: &'static str = "resolver.listen";

    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            bind_container_instance: true,
            make_method: Self::DEFAULT_MAKE_METHOD.to_string(),
            bind_method: Self::DEFAULT_BIND_METHOD.to_string(),
            listener_method: Self::DEFAULT_LISTENER_METHOD.to_string(),
            container_aliases: Vec::new(),
        }
    }

    pub fn with_container_binding(mut self, enabled: bool) -> Self {
        self.bind_container_instance = enabled;
        self
    }

    pub fn with_make_method(mut self, key: impl Into<String>) -> Self {
        self.make_method = key.into();
        self
    }

    pub fn with_bind_method(mut self, key: impl Into<String>) -> Self {
        self.bind_method = key.into();
        self
    }

    pub fn with_listener_method(mut self, key: impl Into<String>) -> Self {
        self.listener_method = key.into();
        self
    }

    /// Add an identifier under which the container is also bound
    pub fn with_container_alias(mut self, alias: impl Into<String>) -> Self {
        self.container_aliases.push(alias.into());
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfigTrait for ProviderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(bind_str) = env::var(ENV_BIND_CONTAINER) {
            config.bind_container_instance = parse_bool("bind_container_instance", &bind_str)?;
        }

        if let Ok(key) = env::var(ENV_MAKE_METHOD) {
            config.make_method = key;
        }

        if let Ok(key) = env::var(ENV_BIND_METHOD) {
            config.bind_method = key;
        }

        if let Ok(key) = env::var(ENV_LISTENER_METHOD) {
            config.listener_method = key;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        KeyValidator.validate("make_method", &self.make_method)?;
        KeyValidator.validate("bind_method", &self.bind_method)?;
        KeyValidator.validate("listener_method", &self.listener_method)?;

        let keys = [&self.make_method, &self.bind_method, &self.listener_method];
        for (i, key) in keys.iter().enumerate() {
            if keys[i + 1..].contains(key) {
                return Err(ConfigError::validation_failed(format!(
                    "entry point key '{}' is used more than once",
                    key
                )));
            }
        }

        for alias in &self.container_aliases {
            KeyValidator.validate("container_aliases", alias)?;
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let fields = [
            ("bind_container_instance", ENV_BIND_CONTAINER, "true"),
            ("make_method", ENV_MAKE_METHOD, Self::DEFAULT_MAKE_METHOD),
            ("bind_method", ENV_BIND_METHOD, Self::DEFAULT_BIND_METHOD),
            ("listener_method", ENV_LISTENER_METHOD, Self::DEFAULT_LISTENER_METHOD),
        ];

        fields
            .iter()
            .map(|(field, var, default)| {
                (field.to_string(), ConfigSource::env_or_default(var, default))
            })
            .collect()
    }
}
