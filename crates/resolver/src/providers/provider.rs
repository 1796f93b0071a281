use crate::config::ConfigError;
use crate::container::Container;
use crate::errors::ResolverError;
use std::sync::Arc;

/// Provider error type
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider registration failed: {message}")]
    RegistrationFailed { message: String },

    #[error("Provider configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),
}

/// Registers services on a [`Container`]
pub trait ServiceProvider: Send + Sync {
    /// Provider name for identification
    fn name(&self) -> &'static str;

    /// Register services on the given container.
    ///
    /// Should only configure services and entry points, not resolve them.
    fn register(&self, container: &Arc<Container>) -> Result<(), ProviderError>;

    /// Provider description
    fn description(&self) -> Option<&'static str> {
        None
    }
}
