//! Constructor metadata for concrete types.
//!
//! Types are registered explicitly with their ordered constructor parameters,
//! each either a class dependency resolved recursively or a scalar that must be
//! supplied by an override or a default. [`TypeRegistry`] is the stock
//! [`TypeMetadata`] provider; hosts with their own type catalogue implement the
//! trait directly.

use crate::container::identifier::{instance, is_null, Identifier, Instance};
use crate::errors::ResolverError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How a constructor parameter is satisfied when no override is given
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// Resolved recursively through the resolver
    Class(Identifier),
    /// Taken from the parameter default
    Scalar,
}

/// One constructor parameter
#[derive(Clone)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub default: Option<Instance>,
}

impl Parameter {
    /// A parameter resolved from the given type identifier
    pub fn class(name: impl Into<String>, dependency: impl Into<Identifier>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Class(dependency.into()),
            default: None,
        }
    }

    /// A scalar parameter
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Scalar,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Instance) -> Self {
        self.default = Some(default);
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Optional parameters fall back to their default when resolution fails
    pub fn is_optional(&self) -> bool {
        self.has_default()
    }

    pub fn class_identifier(&self) -> Option<&Identifier> {
        match &self.kind {
            ParameterKind::Class(id) => Some(id),
            ParameterKind::Scalar => None,
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("has_default", &self.has_default())
            .finish()
    }
}

/// Resolved constructor arguments, in declaration order
pub struct Arguments {
    concrete: Identifier,
    entries: Vec<(String, Instance)>,
}

impl Arguments {
    pub fn new(concrete: Identifier, entries: Vec<(String, Instance)>) -> Self {
        Self { concrete, entries }
    }

    pub fn empty(concrete: Identifier) -> Self {
        Self::new(concrete, Vec::new())
    }

    /// The type being instantiated
    pub fn concrete(&self) -> &Identifier {
        &self.concrete
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn positional(&self, index: usize) -> Option<&Instance> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Raw argument by parameter name
    pub fn instance(&self, name: &str) -> Result<Instance, ResolverError> {
        self.entries
            .iter()
            .find(|(parameter, _)| parameter == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                ResolverError::instantiation(
                    self.concrete.as_str(),
                    format!("no argument named '{}'", name),
                )
            })
    }

    /// Shared class argument by parameter name
    pub fn class<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ResolverError> {
        self.instance(name)?
            .downcast::<T>()
            .map_err(|_| self.type_mismatch::<T>(name))
    }

    /// Class argument that may be the null default
    pub fn optional_class<T: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<T>>, ResolverError> {
        let value = self.instance(name)?;
        if is_null(&value) {
            return Ok(None);
        }
        value
            .downcast::<T>()
            .map(Some)
            .map_err(|_| self.type_mismatch::<T>(name))
    }

    /// Scalar argument by parameter name, cloned out of its instance
    pub fn scalar<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<T, ResolverError> {
        self.instance(name)?
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| self.type_mismatch::<T>(name))
    }

    pub fn into_values(self) -> Vec<Instance> {
        self.entries.into_iter().map(|(_, value)| value).collect()
    }

    fn type_mismatch<T>(&self, name: &str) -> ResolverError {
        ResolverError::instantiation(
            self.concrete.as_str(),
            format!(
                "argument '{}' is not a {}",
                name,
                std::any::type_name::<T>()
            ),
        )
    }
}

/// Builds an instance from resolved arguments
pub type Constructor = Arc<dyn Fn(&Arguments) -> Result<Instance, ResolverError> + Send + Sync>;

/// Source of constructor metadata consumed by the resolver
pub trait TypeMetadata: Send + Sync {
    /// Whether the identifier names a type that can be built directly
    fn is_instantiable(&self, id: &Identifier) -> bool;

    /// Ordered constructor parameters, or `None` when the type declares no constructor
    fn constructor_parameters(&self, id: &Identifier) -> Option<Vec<Parameter>>;

    /// Build an instance from arguments ordered like [`Self::constructor_parameters`]
    fn instantiate(&self, id: &Identifier, arguments: Arguments) -> Result<Instance, ResolverError>;
}

enum TypeDefinition {
    /// Interface or abstract type, only reachable through a binding
    Abstract,
    Concrete {
        parameters: Option<Vec<Parameter>>,
        constructor: Constructor,
    },
}

/// Explicit registry of type metadata
#[derive(Default)]
pub struct TypeRegistry {
    types: HashMap<Identifier, TypeDefinition>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type that can only be resolved through a binding
    pub fn abstract_type(&mut self, id: impl Into<Identifier>) -> &mut Self {
        self.types.insert(id.into(), TypeDefinition::Abstract);
        self
    }

    /// Register a type without a constructor, built through `Default`
    pub fn concrete_default<T: Default + Send + Sync + 'static>(
        &mut self,
        id: impl Into<Identifier>,
    ) -> &mut Self {
        let constructor: Constructor = Arc::new(|_: &Arguments| Ok(instance(T::default())));
        self.types.insert(
            id.into(),
            TypeDefinition::Concrete {
                parameters: None,
                constructor,
            },
        );
        self
    }

    /// Start registering a type with a constructor
    pub fn concrete(&mut self, id: impl Into<Identifier>) -> ConcreteTypeBuilder<'_> {
        ConcreteTypeBuilder {
            registry: self,
            id: id.into(),
            parameters: Vec::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Finish building and share the registry with a resolver
    pub fn into_shared(self) -> Arc<dyn TypeMetadata> {
        Arc::new(self)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.types.keys().collect();
        ids.sort();
        f.debug_struct("TypeRegistry").field("types", &ids).finish()
    }
}

impl TypeMetadata for TypeRegistry {
    fn is_instantiable(&self, id: &Identifier) -> bool {
        matches!(self.types.get(id), Some(TypeDefinition::Concrete { .. }))
    }

    fn constructor_parameters(&self, id: &Identifier) -> Option<Vec<Parameter>> {
        match self.types.get(id)? {
            TypeDefinition::Concrete { parameters, .. } => parameters.clone(),
            TypeDefinition::Abstract => None,
        }
    }

    fn instantiate(&self, id: &Identifier, arguments: Arguments) -> Result<Instance, ResolverError> {
        match self.types.get(id) {
            Some(TypeDefinition::Concrete { constructor, .. }) => constructor(&arguments),
            _ => Err(ResolverError::not_instantiable(id)),
        }
    }
}

/// Fluent registration of a type with constructor parameters
pub struct ConcreteTypeBuilder<'a> {
    registry: &'a mut TypeRegistry,
    id: Identifier,
    parameters: Vec<Parameter>,
}

impl<'a> ConcreteTypeBuilder<'a> {
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Required class dependency
    pub fn class_param(self, name: impl Into<String>, dependency: impl Into<Identifier>) -> Self {
        self.param(Parameter::class(name, dependency))
    }

    /// Class dependency that falls back to `default` when it cannot be resolved
    pub fn optional_class_param(
        self,
        name: impl Into<String>,
        dependency: impl Into<Identifier>,
        default: Instance,
    ) -> Self {
        self.param(Parameter::class(name, dependency).with_default(default))
    }

    /// Scalar without default; must be supplied as an override
    pub fn scalar_param(self, name: impl Into<String>) -> Self {
        self.param(Parameter::scalar(name))
    }

    pub fn scalar_param_with_default<T: Send + Sync + 'static>(
        self,
        name: impl Into<String>,
        default: T,
    ) -> Self {
        self.param(Parameter::scalar(name).with_default(instance(default)))
    }

    /// Register the type with the given constructor
    pub fn constructor<F, T>(self, constructor: F) -> &'a mut TypeRegistry
    where
        F: Fn(&Arguments) -> Result<T, ResolverError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let constructor: Constructor =
            Arc::new(move |arguments: &Arguments| constructor(arguments).map(instance));
        self.registry.types.insert(
            self.id,
            TypeDefinition::Concrete {
                parameters: Some(self.parameters),
                constructor,
            },
        );
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Foo;

    struct Baz {
        foo: Arc<Foo>,
        extra: i64,
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .abstract_type("app::FooInterface")
            .concrete_default::<Foo>("app::Foo")
            .concrete("app::Baz")
            .class_param("foo", "app::Foo")
            .scalar_param_with_default("extra", 5i64)
            .constructor(|args| {
                Ok(Baz {
                    foo: args.class::<Foo>("foo")?,
                    extra: args.scalar::<i64>("extra")?,
                })
            });
        registry
    }

    #[test]
    fn test_instantiability() {
        let registry = registry();

        assert!(registry.is_instantiable(&"app::Foo".into()));
        assert!(registry.is_instantiable(&"app::Baz".into()));
        assert!(!registry.is_instantiable(&"app::FooInterface".into()));
        assert!(!registry.is_instantiable(&"app::Unknown".into()));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_constructor_parameters() {
        let registry = registry();

        assert!(registry.constructor_parameters(&"app::Foo".into()).is_none());

        let parameters = registry.constructor_parameters(&"app::Baz".into()).unwrap();
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "foo");
        assert_eq!(
            parameters[0].class_identifier(),
            Some(&Identifier::new("app::Foo"))
        );
        assert!(!parameters[0].is_optional());
        assert_eq!(parameters[1].kind, ParameterKind::Scalar);
        assert!(parameters[1].has_default());
    }

    #[test]
    fn test_instantiate_with_arguments() {
        let registry = registry();
        let id = Identifier::new("app::Baz");
        let foo = Arc::new(Foo);

        let arguments = Arguments::new(
            id.clone(),
            vec![
                ("foo".to_string(), foo.clone() as Instance),
                ("extra".to_string(), instance(9i64)),
            ],
        );

        let baz = registry
            .instantiate(&id, arguments)
            .unwrap()
            .downcast::<Baz>()
            .unwrap();
        assert!(Arc::ptr_eq(&baz.foo, &foo));
        assert_eq!(baz.extra, 9);
    }

    #[test]
    fn test_argument_type_mismatch() {
        let arguments = Arguments::new(
            Identifier::new("app::Baz"),
            vec![("extra".to_string(), instance("ten"))],
        );

        let result = arguments.scalar::<i64>("extra");
        assert!(matches!(result, Err(ResolverError::Instantiation { .. })));
        assert!(arguments.class::<Foo>("missing").is_err());
    }

    #[test]
    fn test_optional_class_argument() {
        let arguments = Arguments::new(
            Identifier::new("app::Qux"),
            vec![
                ("logger".to_string(), crate::container::identifier::null_instance()),
                ("foo".to_string(), instance(Foo)),
                ("unit".to_string(), instance(())),
            ],
        );

        assert!(arguments.optional_class::<Foo>("logger").unwrap().is_none());
        assert!(arguments.optional_class::<Foo>("foo").unwrap().is_some());
        assert!(arguments.optional_class::<()>("unit").unwrap().is_some());
    }

    #[test]
    fn test_argument_accessors() {
        let arguments = Arguments::new(
            Identifier::new("app::Baz"),
            vec![
                ("foo".to_string(), instance(Foo)),
                ("extra".to_string(), instance(3i64)),
            ],
        );

        assert_eq!(arguments.concrete().as_str(), "app::Baz");
        assert_eq!(arguments.len(), 2);
        assert!(arguments.positional(1).unwrap().is::<i64>());
        assert!(arguments.positional(2).is_none());

        let values = arguments.into_values();
        assert!(values[0].is::<Foo>());
        assert_eq!(values[1].downcast_ref::<i64>(), Some(&3));
        assert!(Arguments::empty(Identifier::new("app::Foo")).is_empty());
    }

    #[test]
    fn test_abstract_type_cannot_be_instantiated() {
        let registry = registry();
        let id = Identifier::new("app::FooInterface");

        let result = registry.instantiate(&id, Arguments::empty(id.clone()));
        assert!(result.unwrap_err().is_binding_resolution());
    }
}
