//! Recursive class resolver for the elif.rs framework.
//!
//! [`ClassResolver`] turns an identifier into an instance: it follows
//! bindings, inspects registered constructor metadata, resolves class-typed
//! parameters recursively, applies caller overrides and scalar defaults, and
//! notifies listeners after every resolution.

pub mod config;
pub mod container;
pub mod errors;
pub mod providers;

pub use config::{AppConfigTrait, ConfigError, ConfigSource, ProviderConfig, ResolverConfig};
pub use container::{
    instance, null_instance, Abstract, Arguments, BindingRegistry, Bindings, ClassResolvedEvent,
    ClassResolver, Concrete, Container, Events, Identifier, Instance, Overrides, Parameter,
    ParameterKind, Resolver, SharedResolver, TypeMetadata, TypeRegistry,
};
pub use errors::ResolverError;
pub use providers::{ProviderError, ResolverServiceProvider, ServiceProvider};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get crate version
pub fn version() -> &'static str {
    VERSION
}
