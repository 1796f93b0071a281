use crate::container::identifier::{instance, Instance};
use crate::errors::ResolverError;
use crate::providers::{ProviderError, ServiceProvider};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Identifier under which the container binds itself
pub const CONTAINER_ID: &str = "elif_resolver::Container";

/// String-keyed store of shared services that providers register into
#[derive(Default)]
pub struct Container {
    services: RwLock<HashMap<String, Instance>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container ready to be handed to providers
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Store a service, replacing any previous entry under `key`
    pub fn set(&self, key: impl Into<String>, service: Instance) -> Result<(), ResolverError> {
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), service);
        Ok(())
    }

    /// Store a plain value
    pub fn set_value<T: Send + Sync + 'static>(
        &self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), ResolverError> {
        self.set(key, instance(value))
    }

    /// Check if a key is registered
    pub fn has(&self, key: &str) -> bool {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Get the untyped service stored under `key`
    pub fn raw(&self, key: &str) -> Option<Instance> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Get the service stored under `key` as a `T`
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Result<Arc<T>, ResolverError> {
        self.raw(key)
            .ok_or_else(|| ResolverError::service_not_found(key))?
            .downcast::<T>()
            .map_err(|_| {
                ResolverError::instantiation(
                    key,
                    format!("stored service is not a {}", std::any::type_name::<T>()),
                )
            })
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Let a provider register its services on this container
    pub fn register<P: ServiceProvider + ?Sized>(
        self: &Arc<Self>,
        provider: &P,
    ) -> Result<(), ProviderError> {
        tracing::info!("Registering provider: {}", provider.name());
        provider.register(self)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container").field("keys", &self.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let container = Container::new();
        container.set_value("greeting", String::from("hello")).unwrap();

        assert!(container.has("greeting"));
        assert_eq!(*container.get::<String>("greeting").unwrap(), "hello");
        assert_eq!(container.keys(), vec!["greeting".to_string()]);
    }

    #[test]
    fn test_missing_and_mistyped_services() {
        let container = Container::new();
        container.set_value("count", 3u32).unwrap();

        assert!(matches!(
            container.get::<u32>("missing"),
            Err(ResolverError::ServiceNotFound { .. })
        ));
        assert!(matches!(
            container.get::<String>("count"),
            Err(ResolverError::Instantiation { .. })
        ));
    }

    #[test]
    fn test_set_replaces_entry() {
        let container = Container::new();
        container.set_value("count", 1u32).unwrap();
        container.set_value("count", 2u32).unwrap();

        assert_eq!(*container.get::<u32>("count").unwrap(), 2);
    }
}
