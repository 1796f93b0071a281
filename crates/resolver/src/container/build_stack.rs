use crate::container::identifier::Identifier;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// Concrete types currently under construction, outermost first.
///
/// Frames are tracked per thread, so concurrent resolutions through one
/// shared resolver never see each other's types.
#[derive(Debug, Default)]
pub struct BuildStack {
    frames: Mutex<HashMap<ThreadId, Vec<Identifier>>>,
}

impl BuildStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `concrete`; the returned frame pops it again when dropped
    pub fn enter(&self, concrete: Identifier) -> BuildFrame<'_> {
        let thread = thread::current().id();
        self.lock()
            .entry(thread)
            .or_default()
            .push(concrete.clone());

        BuildFrame {
            stack: self,
            thread,
            concrete,
        }
    }

    /// Depth of the calling thread's stack
    pub fn len(&self) -> usize {
        self.with_current(|frames| frames.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the calling thread is building a type (for cycle detection)
    pub fn contains(&self, concrete: &Identifier) -> bool {
        self.with_current(|frames| frames.contains(concrete))
    }

    pub fn snapshot(&self) -> Vec<Identifier> {
        self.with_current(|frames| frames.to_vec())
    }

    /// The stack followed by `next`, for error messages
    pub fn path_string(&self, next: &Identifier) -> String {
        self.snapshot()
            .iter()
            .chain(std::iter::once(next))
            .map(Identifier::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ThreadId, Vec<Identifier>>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_current<R>(&self, f: impl FnOnce(&[Identifier]) -> R) -> R {
        let frames = self.lock();
        let current = frames
            .get(&thread::current().id())
            .map(Vec::as_slice)
            .unwrap_or_default();
        f(current)
    }

    fn pop(&self, thread: ThreadId, concrete: &Identifier) {
        let mut frames = self.lock();
        if let Some(stack) = frames.get_mut(&thread) {
            let popped = stack.pop();
            debug_assert_eq!(popped.as_ref(), Some(concrete), "build frames popped out of order");
            if stack.is_empty() {
                frames.remove(&thread);
            }
        }
    }
}

/// Guard for one entry on the [`BuildStack`]
#[derive(Debug)]
pub struct BuildFrame<'a> {
    stack: &'a BuildStack,
    thread: ThreadId,
    concrete: Identifier,
}

impl BuildFrame<'_> {
    pub fn concrete(&self) -> &Identifier {
        &self.concrete
    }
}

impl Drop for BuildFrame<'_> {
    fn drop(&mut self) {
        self.stack.pop(self.thread, &self.concrete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ResolverError;

    #[test]
    fn test_frames_pop_on_drop() {
        let stack = BuildStack::new();
        {
            let outer = stack.enter(Identifier::new("A"));
            assert_eq!(outer.concrete().as_str(), "A");
            {
                let _inner = stack.enter(Identifier::new("B"));
                assert_eq!(stack.len(), 2);
                assert!(stack.contains(&Identifier::new("B")));
            }
            assert_eq!(stack.len(), 1);
            assert!(!stack.contains(&Identifier::new("B")));
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn test_frame_pops_on_error_path() {
        fn failing(stack: &BuildStack) -> Result<(), ResolverError> {
            let _frame = stack.enter(Identifier::new("A"));
            Err(ResolverError::binding_resolution("boom"))
        }

        let stack = BuildStack::new();
        assert!(failing(&stack).is_err());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_path_string() {
        let stack = BuildStack::new();
        let _a = stack.enter(Identifier::new("A"));
        let _b = stack.enter(Identifier::new("B"));

        assert_eq!(stack.path_string(&Identifier::new("A")), "A -> B -> A");
    }

    #[test]
    fn test_threads_have_separate_stacks() {
        let stack = BuildStack::new();
        let _a = stack.enter(Identifier::new("A"));

        std::thread::scope(|scope| {
            scope.spawn(|| {
                assert!(stack.is_empty());
                assert!(!stack.contains(&Identifier::new("A")));
                let _b = stack.enter(Identifier::new("A"));
                assert_eq!(stack.len(), 1);
            });
        });

        assert_eq!(stack.snapshot(), vec![Identifier::new("A")]);
    }
}
