use crate::container::identifier::{Identifier, Instance};
use crate::container::overrides::Overrides;
use crate::container::resolver::Resolver;
use crate::errors::ResolverError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Callable supplying a ready-made instance instead of a constructor build
pub type Factory =
    Arc<dyn Fn(&dyn Resolver, &Overrides) -> Result<Instance, ResolverError> + Send + Sync>;

/// What an abstract identifier is bound to
#[derive(Clone)]
pub enum Concrete {
    /// Another identifier to resolve, possibly the abstract itself
    Identifier(Identifier),
    /// A factory that is fully responsible for building the instance
    Factory(Factory),
}

impl Concrete {
    /// Wrap a closure as a factory binding
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&dyn Resolver, &Overrides) -> Result<Instance, ResolverError> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(factory))
    }

    /// Factory handing out clones of one shared instance
    pub fn shared(instance: Instance) -> Self {
        Self::factory(move |_, _| Ok(instance.clone()))
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, Concrete::Factory(_))
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            Concrete::Identifier(id) => Some(id),
            Concrete::Factory(_) => None,
        }
    }
}

impl fmt::Debug for Concrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concrete::Identifier(id) => f.debug_tuple("Identifier").field(id).finish(),
            Concrete::Factory(_) => write!(f, "Factory(<factory_fn>)"),
        }
    }
}

impl From<Identifier> for Concrete {
    fn from(id: Identifier) -> Self {
        Concrete::Identifier(id)
    }
}

impl From<&str> for Concrete {
    fn from(id: &str) -> Self {
        Concrete::Identifier(Identifier::new(id))
    }
}

impl From<String> for Concrete {
    fn from(id: String) -> Self {
        Concrete::Identifier(Identifier::from(id))
    }
}

/// A registered abstract → concrete mapping
#[derive(Debug, Clone)]
pub struct Binding {
    pub abstract_id: Identifier,
    pub concrete: Concrete,
    /// Kept on the record for hosting stores; resolution ignores it
    pub protect: bool,
}

/// Key-value store the resolver reads its bindings from
pub trait BindingRegistry: Send + Sync {
    fn has(&self, id: &str) -> bool;

    fn get(&self, id: &str) -> Option<Concrete>;

    /// Bind an abstract identifier, replacing any earlier binding for it
    fn bind(&self, abstract_id: Identifier, concrete: Concrete, protect: bool)
        -> Result<(), ResolverError>;
}

/// Default in-memory binding store
#[derive(Clone, Default)]
pub struct Bindings {
    bindings: Arc<RwLock<HashMap<Identifier, Binding>>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full binding record, including the protect flag
    pub fn binding(&self, id: &str) -> Option<Binding> {
        self.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bound abstract identifiers, sorted
    pub fn abstract_ids(&self) -> Vec<Identifier> {
        let mut ids: Vec<_> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    // Every write is a single insert, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Identifier, Binding>> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Identifier, Binding>> {
        self.bindings.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BindingRegistry for Bindings {
    fn has(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    fn get(&self, id: &str) -> Option<Concrete> {
        self.read().get(id).map(|binding| binding.concrete.clone())
    }

    fn bind(
        &self,
        abstract_id: Identifier,
        concrete: Concrete,
        protect: bool,
    ) -> Result<(), ResolverError> {
        tracing::debug!(
            abstract_id = %abstract_id,
            concrete = ?concrete,
            protect,
            "binding registered"
        );

        self.write().insert(
            abstract_id.clone(),
            Binding {
                abstract_id,
                concrete,
                protect,
            },
        );
        Ok(())
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("abstract_ids", &self.abstract_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::identifier::instance;

    #[test]
    fn test_unbound_identifier() {
        let bindings = Bindings::new();
        assert!(!bindings.has("app::FooInterface"));
        assert!(bindings.get("app::FooInterface").is_none());
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_rebinding_replaces_previous_concrete() {
        let bindings = Bindings::new();
        bindings
            .bind("app::FooInterface".into(), "app::Foo".into(), false)
            .unwrap();
        bindings
            .bind("app::FooInterface".into(), Concrete::shared(instance(1u8)), true)
            .unwrap();

        assert_eq!(bindings.len(), 1);
        assert!(bindings.get("app::FooInterface").unwrap().is_factory());

        let binding = bindings.binding("app::FooInterface").unwrap();
        assert!(binding.protect);
        assert_eq!(binding.abstract_id.as_str(), "app::FooInterface");
    }

    #[test]
    fn test_identifier_binding() {
        let bindings = Bindings::new();
        bindings.bind("b".into(), "a".into(), false).unwrap();
        bindings.bind("a".into(), "c".into(), false).unwrap();

        assert_eq!(
            bindings.get("a").unwrap().identifier(),
            Some(&Identifier::new("c"))
        );
        assert_eq!(
            bindings.abstract_ids(),
            vec![Identifier::new("a"), Identifier::new("b")]
        );
    }

    #[test]
    fn test_poisoned_store_keeps_bindings() {
        let bindings = Bindings::new();
        bindings
            .bind("app::FooInterface".into(), "app::Foo".into(), false)
            .unwrap();

        let shared = bindings.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.bindings.write().unwrap();
            panic!("poison the binding store");
        })
        .join();

        assert!(bindings.bindings.is_poisoned());
        assert!(bindings.has("app::FooInterface"));
        assert!(bindings.get("app::FooInterface").is_some());

        bindings.bind("app::Bar".into(), "app::Bar".into(), false).unwrap();
        assert_eq!(bindings.len(), 2);
    }
}
