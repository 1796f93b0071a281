use crate::config::ConfigError;
use crate::container::identifier::Identifier;
use thiserror::Error;

/// Core error type for the class resolver
#[derive(Debug, Error)]
pub enum ResolverError {
    /// A type or parameter could not be resolved from the current bindings
    #[error("{message}")]
    BindingResolution { message: String },

    #[error("Circular dependency detected: {path} (cycle at: {cycle_service})")]
    CircularDependency { path: String, cycle_service: String },

    #[error("Binding chain for '{abstract_id}' exceeded {depth} hops")]
    BindingChainTooDeep { abstract_id: String, depth: usize },

    #[error("Invalid override: {message}")]
    InvalidOverride { message: String },

    #[error("Instantiation of '{service_type}' failed: {message}")]
    Instantiation {
        service_type: String,
        message: String,
    },

    #[error("Service not found: {service_type}")]
    ServiceNotFound { service_type: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ResolverError {
    /// Create a new binding resolution error
    pub fn binding_resolution(message: impl Into<String>) -> Self {
        Self::BindingResolution {
            message: message.into(),
        }
    }

    /// Error for a type that has no usable binding and cannot be built directly
    pub fn not_instantiable(concrete: &Identifier) -> Self {
        Self::binding_resolution(format!("Target [{}] is not instantiable.", concrete))
    }

    /// Error for a scalar constructor parameter with neither override nor default
    pub fn unresolvable_parameter(parameter: &str, declaring_type: &Identifier) -> Self {
        Self::binding_resolution(format!(
            "Unresolvable dependency resolving [${}] in class {}",
            parameter, declaring_type
        ))
    }

    /// Create a new instantiation error
    pub fn instantiation(service_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Instantiation {
            service_type: service_type.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid override error
    pub fn invalid_override(message: impl Into<String>) -> Self {
        Self::InvalidOverride {
            message: message.into(),
        }
    }

    /// Create a new service not found error
    pub fn service_not_found(service_type: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_type: service_type.into(),
        }
    }

    /// Check if the error is a binding resolution error
    ///
    /// Only these errors are swallowed by the optional-parameter fallback.
    pub fn is_binding_resolution(&self) -> bool {
        matches!(self, Self::BindingResolution { .. })
    }

    /// Check if the error is a circular dependency error
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_instantiable_message() {
        let error = ResolverError::not_instantiable(&Identifier::new("app::FooInterface"));

        assert!(error.is_binding_resolution());
        assert_eq!(
            error.to_string(),
            "Target [app::FooInterface] is not instantiable."
        );
    }

    #[test]
    fn test_unresolvable_parameter_names_declaring_type() {
        let error = ResolverError::unresolvable_parameter("extra", &Identifier::new("app::Baz"));

        assert!(error.is_binding_resolution());
        assert!(error.to_string().contains("[$extra]"));
        assert!(error.to_string().contains("app::Baz"));
    }

    #[test]
    fn test_circular_dependency_is_not_binding_resolution() {
        let error = ResolverError::CircularDependency {
            path: "A -> B -> A".to_string(),
            cycle_service: "A".to_string(),
        };

        assert!(error.is_circular_dependency());
        assert!(!error.is_binding_resolution());
    }
}
