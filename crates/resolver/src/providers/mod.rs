pub mod provider;
pub mod resolver_provider;

pub use provider::{ProviderError, ServiceProvider};
pub use resolver_provider::{
    BindMethod, ListenerMethod, MakeMethod, ResolverServiceProvider, CLASS_RESOLVER,
    CLASS_RESOLVER_KEY,
};
