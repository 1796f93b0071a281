use crate::config::{AppConfigTrait, ProviderConfig, ResolverConfig};
use crate::container::{
    listener, Abstract, ClassResolvedEvent, ClassResolver, Concrete, Container, Identifier,
    Instance, Listener, Overrides, Resolver, SharedResolver, TypeMetadata, CONTAINER_ID,
};
use crate::errors::ResolverError;
use crate::providers::{ProviderError, ServiceProvider};
use std::collections::HashSet;
use std::sync::{Arc, Weak};

/// Container key of the shared resolver
pub const CLASS_RESOLVER: &str = "elif_resolver.class_resolver";

/// Container key holding the name of the make entry point
pub const CLASS_RESOLVER_KEY: &str = "elif_resolver.class_resolver_key";

/// Look the resolver up at call time so a replaced resolver takes effect
fn current_resolver(container: &Weak<Container>) -> Result<SharedResolver, ResolverError> {
    let container = container
        .upgrade()
        .ok_or_else(|| ResolverError::service_not_found(CONTAINER_ID))?;
    let resolver = container.get::<SharedResolver>(CLASS_RESOLVER)?;
    Ok(SharedResolver::clone(&resolver))
}

/// `make` entry point stored on the container
#[derive(Clone)]
pub struct MakeMethod {
    container: Weak<Container>,
}

impl MakeMethod {
    pub fn call(
        &self,
        abstract_: impl Into<Abstract>,
        overrides: &Overrides,
    ) -> Result<Instance, ResolverError> {
        current_resolver(&self.container)?.resolve(abstract_.into(), overrides)
    }

    /// Resolve and downcast to `T`
    pub fn make<T: Send + Sync + 'static>(
        &self,
        id: impl Into<Identifier>,
    ) -> Result<Arc<T>, ResolverError> {
        let id = id.into();
        self.call(&id, &Overrides::new())?
            .downcast::<T>()
            .map_err(|_| {
                ResolverError::instantiation(
                    id.as_str(),
                    format!("resolved instance is not a {}", std::any::type_name::<T>()),
                )
            })
    }
}

/// `bind` entry point stored on the container
#[derive(Clone)]
pub struct BindMethod {
    container: Weak<Container>,
}

impl BindMethod {
    pub fn call(
        &self,
        abstract_id: impl Into<Identifier>,
        concrete: impl Into<Concrete>,
        protect: bool,
    ) -> Result<(), ResolverError> {
        current_resolver(&self.container)?.bind(abstract_id.into(), concrete.into(), protect)
    }
}

/// Listener registration entry point stored on the container
#[derive(Clone)]
pub struct ListenerMethod {
    container: Weak<Container>,
}

impl ListenerMethod {
    pub fn call(
        &self,
        callback: Listener,
        kinds: Option<HashSet<String>>,
    ) -> Result<(), ResolverError> {
        current_resolver(&self.container)?.register_event_listener(callback, kinds)
    }

    pub fn listen<F>(&self, callback: F, kinds: Option<HashSet<String>>) -> Result<(), ResolverError>
    where
        F: Fn(&ClassResolvedEvent, &str) + Send + Sync + 'static,
    {
        self.call(listener(callback), kinds)
    }
}

/// Registers a [`ClassResolver`] and its entry points on a container
pub struct ResolverServiceProvider {
    metadata: Arc<dyn TypeMetadata>,
    config: ProviderConfig,
    resolver_config: ResolverConfig,
}

impl ResolverServiceProvider {
    pub fn new(metadata: Arc<dyn TypeMetadata>) -> Self {
        Self {
            metadata,
            config: ProviderConfig::default(),
            resolver_config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver_config = config;
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn check_reserved_keys(&self) -> Result<(), ProviderError> {
        let entry_points = [
            &self.config.make_method,
            &self.config.bind_method,
            &self.config.listener_method,
        ];

        match entry_points
            .iter()
            .find(|key| key.as_str() == CLASS_RESOLVER || key.as_str() == CLASS_RESOLVER_KEY)
        {
            Some(key) => Err(ProviderError::RegistrationFailed {
                message: format!("entry point key '{}' is reserved", key),
            }),
            None => Ok(()),
        }
    }

    /// Bind the container under its own identifier and every alias
    fn bind_container(
        &self,
        resolver: &ClassResolver,
        container: &Arc<Container>,
    ) -> Result<(), ResolverError> {
        let ids = std::iter::once(CONTAINER_ID.to_string()).chain(
            self.config
                .container_aliases
                .iter()
                .filter(|alias| alias.as_str() != CONTAINER_ID)
                .cloned(),
        );

        for id in ids {
            let weak = Arc::downgrade(container);
            let concrete = Concrete::factory(move |_, _| {
                weak.upgrade()
                    .map(|container| container as Instance)
                    .ok_or_else(|| ResolverError::service_not_found(CONTAINER_ID))
            });
            resolver.bind(Identifier::from(id), concrete, true)?;
        }

        Ok(())
    }
}

impl ServiceProvider for ResolverServiceProvider {
    fn name(&self) -> &'static str {
        "elif_resolver.class_resolver_provider"
    }

    fn register(&self, container: &Arc<Container>) -> Result<(), ProviderError> {
        self.config.validate()?;
        self.check_reserved_keys()?;

        let resolver = ClassResolver::new(self.metadata.clone())
            .with_config(self.resolver_config.clone())?;

        if self.config.bind_container_instance {
            self.bind_container(&resolver, container)?;
        }

        let shared: SharedResolver = Arc::new(resolver);
        let weak = Arc::downgrade(container);

        container.set_value(CLASS_RESOLVER, shared)?;
        container.set_value(CLASS_RESOLVER_KEY, self.config.make_method.clone())?;
        container.set_value(
            self.config.make_method.clone(),
            MakeMethod {
                container: weak.clone(),
            },
        )?;
        container.set_value(
            self.config.bind_method.clone(),
            BindMethod {
                container: weak.clone(),
            },
        )?;
        container.set_value(
            self.config.listener_method.clone(),
            ListenerMethod { container: weak },
        )?;

        tracing::info!(
            make = %self.config.make_method,
            bind = %self.config.bind_method,
            listen = %self.config.listener_method,
            bind_container = self.config.bind_container_instance,
            "class resolver registered"
        );

        Ok(())
    }

    fn description(&self) -> Option<&'static str> {
        Some("Registers the class resolver and its make/bind/listen entry points")
    }
}
