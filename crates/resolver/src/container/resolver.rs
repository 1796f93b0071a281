use crate::config::{AppConfigTrait, ResolverConfig};
use crate::container::binding::{BindingRegistry, Bindings, Concrete};
use crate::container::build_stack::BuildStack;
use crate::container::events::{listener, ClassResolvedEvent, EventDispatcher, Events, Listener};
use crate::container::identifier::{Abstract, Identifier, Instance};
use crate::container::metadata::{Arguments, Parameter, ParameterKind, TypeMetadata};
use crate::container::overrides::Overrides;
use crate::errors::ResolverError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Public entry points of a class resolver
pub trait Resolver: Send + Sync {
    /// Instantiate a concrete instance of the given type
    fn resolve(&self, abstract_: Abstract, overrides: &Overrides) -> Result<Instance, ResolverError>;

    /// Bind an abstract definition to a concrete implementation
    fn bind(
        &self,
        abstract_id: Identifier,
        concrete: Concrete,
        protect: bool,
    ) -> Result<(), ResolverError>;

    /// Register a listener for the given event kinds, or every kind when `None`
    fn register_event_listener(
        &self,
        listener: Listener,
        kinds: Option<HashSet<String>>,
    ) -> Result<(), ResolverError>;
}

/// A resolver shared through the service container
pub type SharedResolver = Arc<dyn Resolver>;

/// Builds instances by following bindings and recursively resolving constructor parameters
pub struct ClassResolver {
    bindings: Arc<dyn BindingRegistry>,
    metadata: Arc<dyn TypeMetadata>,
    dispatcher: EventDispatcher,
    build_stack: BuildStack,
    config: ResolverConfig,
}

impl ClassResolver {
    /// Create a resolver with its own empty binding store
    pub fn new(metadata: Arc<dyn TypeMetadata>) -> Self {
        Self::with_bindings(metadata, Arc::new(Bindings::new()))
    }

    /// Create a resolver reading bindings from an external store
    pub fn with_bindings(metadata: Arc<dyn TypeMetadata>, bindings: Arc<dyn BindingRegistry>) -> Self {
        Self {
            bindings,
            metadata,
            dispatcher: EventDispatcher::new(),
            build_stack: BuildStack::new(),
            config: ResolverConfig::default(),
        }
    }

    /// Replace the configuration after validating it
    pub fn with_config(mut self, config: ResolverConfig) -> Result<Self, ResolverError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn bindings(&self) -> &Arc<dyn BindingRegistry> {
        &self.bindings
    }

    pub fn metadata(&self) -> &Arc<dyn TypeMetadata> {
        &self.metadata
    }

    /// Types currently under construction
    pub fn build_stack(&self) -> &BuildStack {
        &self.build_stack
    }

    pub fn listener_count(&self) -> usize {
        self.dispatcher.len()
    }

    /// Resolve a type by name without overrides
    pub fn resolve_named(&self, id: impl Into<Identifier>) -> Result<Instance, ResolverError> {
        self.resolve_with_depth(Abstract::Name(id.into()), &Overrides::new(), 0)
    }

    /// Resolve a type and downcast it to `T`
    pub fn make<T: Send + Sync + 'static>(
        &self,
        id: impl Into<Identifier>,
    ) -> Result<Arc<T>, ResolverError> {
        self.make_with(id, &Overrides::new())
    }

    /// Resolve a type with overrides and downcast it to `T`
    pub fn make_with<T: Send + Sync + 'static>(
        &self,
        id: impl Into<Identifier>,
        overrides: &Overrides,
    ) -> Result<Arc<T>, ResolverError> {
        let id = id.into();
        self.resolve_with_depth(Abstract::Name(id.clone()), overrides, 0)?
            .downcast::<T>()
            .map_err(|_| {
                ResolverError::instantiation(
                    id.as_str(),
                    format!("resolved instance is not a {}", std::any::type_name::<T>()),
                )
            })
    }

    /// Bind an abstract identifier to a factory closure
    pub fn bind_factory<F>(&self, abstract_id: impl Into<Identifier>, factory: F) -> Result<(), ResolverError>
    where
        F: Fn(&dyn Resolver, &Overrides) -> Result<Instance, ResolverError> + Send + Sync + 'static,
    {
        self.bindings
            .bind(abstract_id.into(), Concrete::factory(factory), false)
    }

    /// Register a listener closure
    pub fn listen<F>(&self, callback: F, kinds: Option<HashSet<String>>) -> Result<(), ResolverError>
    where
        F: Fn(&ClassResolvedEvent, &str) + Send + Sync + 'static,
    {
        self.dispatcher.listen(listener(callback), kinds)
    }

    /// One resolution frame. `hops` counts binding indirections followed so far.
    fn resolve_with_depth(
        &self,
        abstract_: Abstract,
        overrides: &Overrides,
        hops: usize,
    ) -> Result<Instance, ResolverError> {
        let abstract_id = match abstract_ {
            Abstract::Value(value) => return Ok(value),
            Abstract::Name(id) => id,
        };

        let concrete = self.concrete_for(&abstract_id);

        // Buildable when the candidate is the requested type itself or a factory;
        // any other identifier is one more hop along the binding chain.
        let object = match concrete {
            Concrete::Factory(factory) => {
                // Factories re-enter the resolver, so they take a frame like a build.
                self.check_cycle(&abstract_id)?;
                let _frame = self.build_stack.enter(abstract_id.clone());
                tracing::debug!(abstract_id = %abstract_id, "resolving through factory");
                factory(self as &dyn Resolver, overrides)?
            }
            Concrete::Identifier(concrete_id) if concrete_id == abstract_id => {
                self.build(&concrete_id, overrides)?
            }
            Concrete::Identifier(next) => {
                if hops >= self.config.max_binding_depth {
                    return Err(ResolverError::BindingChainTooDeep {
                        abstract_id: abstract_id.to_string(),
                        depth: self.config.max_binding_depth,
                    });
                }
                tracing::trace!(abstract_id = %abstract_id, next = %next, "following binding");
                self.resolve_with_depth(Abstract::Name(next), overrides, hops + 1)?
            }
        };

        self.dispatch(Events::CLASS_RESOLVED, ClassResolvedEvent::new(object.clone()));

        Ok(object)
    }

    /// Get the concrete type for a given abstract.
    ///
    /// Unbound identifiers are their own concrete type, unless only the rooted
    /// form (`::name`) is bound.
    fn concrete_for(&self, abstract_id: &Identifier) -> Concrete {
        if let Some(concrete) = self.bindings.get(abstract_id.as_str()) {
            return concrete;
        }

        if !abstract_id.is_rooted() {
            let rooted = abstract_id.rooted();
            if self.bindings.has(rooted.as_str()) {
                return Concrete::Identifier(rooted);
            }
        }

        Concrete::Identifier(abstract_id.clone())
    }

    /// Instantiate a concrete type, resolving its constructor dependencies
    fn build(&self, concrete: &Identifier, overrides: &Overrides) -> Result<Instance, ResolverError> {
        if !self.metadata.is_instantiable(concrete) {
            return Err(ResolverError::not_instantiable(concrete));
        }

        self.check_cycle(concrete)?;

        let _frame = self.build_stack.enter(concrete.clone());

        let parameters = match self.metadata.constructor_parameters(concrete) {
            Some(parameters) => parameters,
            None => {
                tracing::debug!(concrete = %concrete, "building type without constructor");
                return self
                    .metadata
                    .instantiate(concrete, Arguments::empty(concrete.clone()));
            }
        };

        tracing::debug!(
            concrete = %concrete,
            parameters = parameters.len(),
            depth = self.build_stack.len(),
            "building type"
        );

        let primitives = overrides.keyed_by_parameter(&parameters, concrete)?;
        let dependencies = self.resolve_dependencies(concrete, &parameters, primitives)?;

        self.metadata
            .instantiate(concrete, Arguments::new(concrete.clone(), dependencies))
    }

    /// Fail when `id` is already being built or produced on this thread
    fn check_cycle(&self, id: &Identifier) -> Result<(), ResolverError> {
        if self.config.detect_cycles && self.build_stack.contains(id) {
            return Err(ResolverError::CircularDependency {
                path: self.build_stack.path_string(id),
                cycle_service: id.to_string(),
            });
        }
        Ok(())
    }

    /// Resolve every constructor parameter in declaration order
    fn resolve_dependencies(
        &self,
        concrete: &Identifier,
        parameters: &[Parameter],
        mut primitives: HashMap<String, Instance>,
    ) -> Result<Vec<(String, Instance)>, ResolverError> {
        let mut dependencies = Vec::with_capacity(parameters.len());

        for parameter in parameters {
            let value = match (primitives.remove(&parameter.name), &parameter.kind) {
                (Some(value), _) => {
                    tracing::trace!(parameter = %parameter.name, "using override");
                    value
                }
                (None, ParameterKind::Scalar) => self.resolve_non_class(concrete, parameter)?,
                (None, ParameterKind::Class(dependency)) => {
                    self.resolve_class(concrete, parameter, dependency)?
                }
            };
            dependencies.push((parameter.name.clone(), value));
        }

        Ok(dependencies)
    }

    fn resolve_non_class(
        &self,
        concrete: &Identifier,
        parameter: &Parameter,
    ) -> Result<Instance, ResolverError> {
        parameter
            .default
            .clone()
            .ok_or_else(|| ResolverError::unresolvable_parameter(&parameter.name, concrete))
    }

    fn resolve_class(
        &self,
        concrete: &Identifier,
        parameter: &Parameter,
        dependency: &Identifier,
    ) -> Result<Instance, ResolverError> {
        match self.resolve_with_depth(Abstract::Name(dependency.clone()), &Overrides::new(), 0) {
            Ok(value) => Ok(value),
            Err(error) if error.is_binding_resolution() => match &parameter.default {
                Some(default) => {
                    tracing::warn!(
                        concrete = %concrete,
                        parameter = %parameter.name,
                        error = %error,
                        "dependency unresolvable, using parameter default"
                    );
                    Ok(default.clone())
                }
                None => Err(error),
            },
            Err(error) => Err(error),
        }
    }

    fn dispatch(&self, kind: &str, event: ClassResolvedEvent) {
        let fired = self.dispatcher.dispatch(kind, &event);
        tracing::trace!(kind, fired, "event dispatched");
    }
}

impl Resolver for ClassResolver {
    fn resolve(&self, abstract_: Abstract, overrides: &Overrides) -> Result<Instance, ResolverError> {
        self.resolve_with_depth(abstract_, overrides, 0)
    }

    fn bind(
        &self,
        abstract_id: Identifier,
        concrete: Concrete,
        protect: bool,
    ) -> Result<(), ResolverError> {
        self.bindings.bind(abstract_id, concrete, protect)
    }

    fn register_event_listener(
        &self,
        listener: Listener,
        kinds: Option<HashSet<String>>,
    ) -> Result<(), ResolverError> {
        self.dispatcher.listen(listener, kinds)
    }
}

impl std::fmt::Debug for ClassResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassResolver")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .field("build_stack", &self.build_stack)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::identifier::{instance, null_instance};
    use crate::container::metadata::TypeRegistry;

    #[derive(Debug, Default)]
    struct Foo;

    #[derive(Debug)]
    struct Bar {
        foo: Arc<Foo>,
    }

    #[derive(Debug)]
    struct Qux {
        logger: Option<Arc<Foo>>,
    }

    #[derive(Debug)]
    struct Holder {
        unit: Option<Arc<()>>,
    }

    fn resolver() -> ClassResolver {
        let mut types = TypeRegistry::new();
        types
            .abstract_type("app::FooInterface")
            .abstract_type("app::Logger")
            .concrete_default::<Foo>("app::Foo")
            .concrete("app::Bar")
            .class_param("foo", "app::FooInterface")
            .constructor(|args| Ok(Bar { foo: args.class::<Foo>("foo")? }));
        types
            .concrete("app::Qux")
            .optional_class_param("logger", "app::Logger", null_instance())
            .constructor(|args| {
                Ok(Qux {
                    logger: args.optional_class::<Foo>("logger")?,
                })
            });
        types
            .concrete("app::Unit")
            .constructor(|_| Ok(()))
            .concrete("app::Holder")
            .optional_class_param("unit", "app::Unit", null_instance())
            .constructor(|args| {
                Ok(Holder {
                    unit: args.optional_class::<()>("unit")?,
                })
            });
        types
            .concrete("app::A")
            .class_param("b", "app::B")
            .constructor(|_| Ok(()));
        types
            .concrete("app::B")
            .class_param("a", "app::A")
            .constructor(|_| Ok(()));

        ClassResolver::new(types.into_shared())
    }

    #[test]
    fn test_value_is_returned_unchanged() {
        let resolver = resolver();
        let value = instance(Foo);

        let resolved = resolver
            .resolve(Abstract::Value(value.clone()), &Overrides::new())
            .unwrap();
        assert!(Arc::ptr_eq(&resolved, &value));
    }

    #[test]
    fn test_rooted_binding_is_used_for_plain_name() {
        let resolver = resolver();
        resolver
            .bind("::app::FooInterface".into(), "app::Foo".into(), false)
            .unwrap();

        let bar = resolver.make::<Bar>("app::Bar").unwrap();
        assert_eq!(Arc::strong_count(&bar.foo), 1);
        assert!(resolver.make::<Foo>("app::FooInterface").is_ok());
    }

    #[test]
    fn test_optional_class_falls_back_to_default() {
        let resolver = resolver();

        let qux = resolver.make::<Qux>("app::Qux").unwrap();
        assert!(qux.logger.is_none());

        resolver.bind("app::Logger".into(), "app::Foo".into(), false).unwrap();
        let qux = resolver.make::<Qux>("app::Qux").unwrap();
        assert!(qux.logger.is_some());
    }

    #[test]
    fn test_circular_dependency_is_detected() {
        let resolver = resolver();

        let error = resolver.make::<()>("app::A").unwrap_err();
        match error {
            ResolverError::CircularDependency { path, cycle_service } => {
                assert_eq!(path, "app::A -> app::B -> app::A");
                assert_eq!(cycle_service, "app::A");
            }
            other => panic!("Expected CircularDependency, got {:?}", other),
        }
        assert!(resolver.build_stack().is_empty());
    }

    #[test]
    fn test_binding_chain_depth_is_bounded() {
        let resolver = resolver()
            .with_config(ResolverConfig::new().with_max_binding_depth(4))
            .unwrap();
        resolver.bind("app::X".into(), "app::Y".into(), false).unwrap();
        resolver.bind("app::Y".into(), "app::X".into(), false).unwrap();

        let error = resolver.make::<Foo>("app::X").unwrap_err();
        assert!(matches!(
            error,
            ResolverError::BindingChainTooDeep { depth: 4, .. }
        ));
    }

    #[test]
    fn test_self_binding_builds_directly() {
        let resolver = resolver();
        resolver.bind("app::Foo".into(), "app::Foo".into(), false).unwrap();

        assert!(resolver.make::<Foo>("app::Foo").is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = resolver().with_config(ResolverConfig::new().with_max_binding_depth(0));
        assert!(matches!(result, Err(ResolverError::Config(_))));
    }

    #[test]
    fn test_make_with_wrong_type() {
        let resolver = resolver();
        let result = resolver.make::<Bar>("app::Foo");
        assert!(matches!(result, Err(ResolverError::Instantiation { .. })));
    }

    #[test]
    fn test_factory_cycle_is_detected() {
        let resolver = resolver();
        resolver
            .bind_factory("app::Ping", |resolver, _| {
                resolver.resolve("app::Pong".into(), &Overrides::new())
            })
            .unwrap();
        resolver
            .bind_factory("app::Pong", |resolver, _| {
                resolver.resolve("app::Ping".into(), &Overrides::new())
            })
            .unwrap();

        let error = resolver.resolve_named("app::Ping").unwrap_err();
        match error {
            ResolverError::CircularDependency { path, cycle_service } => {
                assert_eq!(path, "app::Ping -> app::Pong -> app::Ping");
                assert_eq!(cycle_service, "app::Ping");
            }
            other => panic!("Expected CircularDependency, got {:?}", other),
        }
        assert!(resolver.build_stack().is_empty());
    }

    #[test]
    fn test_factory_cycle_through_constructor_is_detected() {
        let resolver = resolver();
        resolver
            .bind_factory("app::FooInterface", |resolver, _| {
                resolver.resolve("app::Bar".into(), &Overrides::new())
            })
            .unwrap();

        let error = resolver.make::<Bar>("app::Bar").unwrap_err();
        assert!(error.is_circular_dependency());
        assert!(error
            .to_string()
            .contains("app::Bar -> app::FooInterface -> app::Bar"));
    }

    #[test]
    fn test_unit_dependency_is_not_the_null_default() {
        let resolver = resolver();

        let holder = resolver.make::<Holder>("app::Holder").unwrap();
        assert!(holder.unit.is_some());
    }

    #[test]
    fn test_accessors_reflect_construction() {
        let resolver = resolver()
            .with_config(ResolverConfig::new().with_cycle_detection(false))
            .unwrap();
        resolver.bind("app::Logger".into(), "app::Foo".into(), false).unwrap();
        resolver.listen(|_, _| {}, None).unwrap();

        assert!(!resolver.config().detect_cycles);
        assert_eq!(resolver.config().max_binding_depth, 64);
        assert!(resolver.bindings().has("app::Logger"));
        assert!(resolver.metadata().is_instantiable(&"app::Qux".into()));
        assert!(!resolver.metadata().is_instantiable(&"app::Logger".into()));
        assert_eq!(resolver.listener_count(), 1);
    }
}
