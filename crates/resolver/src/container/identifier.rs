use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Prefix of a fully rooted identifier (`::app::Mailer`)
pub const NAMESPACE_ROOT: &str = "::";

/// A resolved value: a built instance, an override or a parameter default
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wrap a value as an [`Instance`]
pub fn instance<T: Send + Sync + 'static>(value: T) -> Instance {
    Arc::new(value)
}

/// Marker behind [`null_instance`]; private so no resolved value can collide with it
#[derive(Debug)]
struct Null;

/// Instance standing in for "no value", used as the default of optional class parameters
pub fn null_instance() -> Instance {
    Arc::new(Null)
}

/// Check whether an instance is the [`null_instance`] marker
pub fn is_null(instance: &Instance) -> bool {
    instance.is::<Null>()
}

/// Name of an abstract or concrete type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier derived from a Rust type name
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the identifier already carries the namespace root prefix
    pub fn is_rooted(&self) -> bool {
        self.0.starts_with(NAMESPACE_ROOT)
    }

    /// The same identifier with the namespace root prefix
    pub fn rooted(&self) -> Identifier {
        if self.is_rooted() {
            self.clone()
        } else {
            Self(format!("{}{}", NAMESPACE_ROOT, self.0))
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

/// What a caller asks the resolver for
#[derive(Clone)]
pub enum Abstract {
    /// A type name to look up and build
    Name(Identifier),
    /// An already resolved value, handed back unchanged
    Value(Instance),
}

impl Abstract {
    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            Abstract::Name(id) => Some(id),
            Abstract::Value(_) => None,
        }
    }
}

impl fmt::Debug for Abstract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Abstract::Name(id) => f.debug_tuple("Name").field(id).finish(),
            Abstract::Value(_) => f.debug_tuple("Value").field(&"<instance>").finish(),
        }
    }
}

impl From<Identifier> for Abstract {
    fn from(id: Identifier) -> Self {
        Abstract::Name(id)
    }
}

impl From<&Identifier> for Abstract {
    fn from(id: &Identifier) -> Self {
        Abstract::Name(id.clone())
    }
}

impl From<&str> for Abstract {
    fn from(id: &str) -> Self {
        Abstract::Name(Identifier::new(id))
    }
}

impl From<String> for Abstract {
    fn from(id: String) -> Self {
        Abstract::Name(Identifier::from(id))
    }
}

impl From<Instance> for Abstract {
    fn from(value: Instance) -> Self {
        Abstract::Value(value)
    }
}
