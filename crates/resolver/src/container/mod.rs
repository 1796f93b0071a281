pub mod binding;
pub mod build_stack;
#[allow(clippy::module_inception)]
pub mod container;
pub mod events;
pub mod identifier;
pub mod metadata;
pub mod overrides;
pub mod resolver;

pub use binding::{Binding, BindingRegistry, Bindings, Concrete, Factory};
pub use build_stack::{BuildFrame, BuildStack};
pub use container::{Container, CONTAINER_ID};
pub use events::{listener, ClassResolvedEvent, EventDispatcher, Events, Listener};
pub use identifier::{instance, is_null, null_instance, Abstract, Identifier, Instance, NAMESPACE_ROOT};
pub use metadata::{
    Arguments, ConcreteTypeBuilder, Constructor, Parameter, ParameterKind, TypeMetadata,
    TypeRegistry,
};
pub use overrides::{OverrideKey, Overrides};
pub use resolver::{ClassResolver, Resolver, SharedResolver};
