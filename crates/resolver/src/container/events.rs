use crate::container::identifier::Instance;
use crate::errors::ResolverError;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Event kinds emitted by the resolver
pub struct Events;

impl Events {
    /// A type has been resolved and instantiated out of the resolver
    pub const CLASS_RESOLVED: &'static str = "elif_resolver::class_resolved";

    /// Interest set containing the given kinds
    pub fn only<I, S>(kinds: I) -> Option<HashSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Some(kinds.into_iter().map(Into::into).collect())
    }
}

/// Payload of [`Events::CLASS_RESOLVED`]
#[derive(Clone)]
pub struct ClassResolvedEvent {
    instance: Instance,
}

impl ClassResolvedEvent {
    pub fn new(instance: Instance) -> Self {
        Self { instance }
    }

    pub fn resolved_object(&self) -> &Instance {
        &self.instance
    }

    /// The resolved object, if it is a `T`
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.instance.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for ClassResolvedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassResolvedEvent")
            .field("instance", &"<instance>")
            .finish()
    }
}

/// Callback invoked with the event and its kind
pub type Listener = Arc<dyn Fn(&ClassResolvedEvent, &str) + Send + Sync>;

/// Wrap a closure as a [`Listener`]
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&ClassResolvedEvent, &str) + Send + Sync + 'static,
{
    Arc::new(callback)
}

#[derive(Clone)]
struct Registration {
    callback: Listener,
    /// `None` means every kind
    kinds: Option<HashSet<String>>,
}

impl Registration {
    fn is_interested(&self, kind: &str) -> bool {
        self.kinds.as_ref().map_or(true, |kinds| kinds.contains(kind))
    }
}

/// Ordered, append-only list of listeners
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<Vec<Registration>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(
        &self,
        callback: Listener,
        kinds: Option<HashSet<String>>,
    ) -> Result<(), ResolverError> {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration { callback, kinds });
        Ok(())
    }

    /// Relay an event to every interested listener, in registration order.
    ///
    /// Returns how many listeners fired.
    pub fn dispatch(&self, kind: &str, event: &ClassResolvedEvent) -> usize {
        // Listeners may register further listeners, so call them outside the lock.
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut fired = 0;
        for registration in listeners.iter().filter(|r| r.is_interested(kind)) {
            (registration.callback)(event, kind);
            fired += 1;
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.len())
            .finish()
    }
}
