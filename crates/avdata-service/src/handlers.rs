//! Resource event handler table.
//!
//! Handlers are registered per canonical path and fire after the management
//! side reads or writes that resource. The table hands out clones of the
//! matching handlers so callers can invoke them with no lock held.

use std::collections::HashMap;
use std::sync::Arc;

use avdata_core::ResourceEvent;

/// Callback invoked for management-side accesses to a resource.
pub type ResourceEventHandler = Arc<dyn Fn(&ResourceEvent) + Send + Sync>;

/// Opaque reference to a registered handler, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerRef(u64);

#[derive(Default)]
pub(crate) struct HandlerTable {
    next_id: u64,
    by_path: HashMap<String, Vec<(HandlerRef, ResourceEventHandler)>>,
}

impl HandlerTable {
    pub(crate) fn add(&mut self, path: String, handler: ResourceEventHandler) -> HandlerRef {
        self.next_id += 1;
        let handler_ref = HandlerRef(self.next_id);
        self.by_path
            .entry(path)
            .or_default()
            .push((handler_ref, handler));
        handler_ref
    }

    /// Remove a handler. Returns false if it was not registered.
    pub(crate) fn remove(&mut self, handler_ref: HandlerRef) -> bool {
        let mut removed = false;
        self.by_path.retain(|_, handlers| {
            let before = handlers.len();
            handlers.retain(|(r, _)| *r != handler_ref);
            removed |= handlers.len() != before;
            !handlers.is_empty()
        });
        removed
    }

    pub(crate) fn matching(&self, path: &str) -> Vec<ResourceEventHandler> {
        self.by_path
            .get(path)
            .map(|handlers| handlers.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_path.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avdata_core::{AccessKind, EventKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event(path: &str) -> ResourceEvent {
        ResourceEvent {
            path: path.to_string(),
            access: AccessKind::Setting,
            kind: EventKind::Write,
        }
    }

    #[test]
    fn test_add_and_match() {
        let mut table = HandlerTable::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        table.add(
            "/a/b".to_string(),
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        for handler in table.matching("/a/b") {
            handler(&event("/a/b"));
        }
        assert!(table.matching("/a/c").is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove() {
        let mut table = HandlerTable::default();
        let first = table.add("/a/b".to_string(), Arc::new(|_| {}));
        let second = table.add("/a/b".to_string(), Arc::new(|_| {}));
        assert_ne!(first, second);
        assert_eq!(table.len(), 2);

        assert!(table.remove(first));
        assert!(!table.remove(first));
        assert_eq!(table.matching("/a/b").len(), 1);

        assert!(table.remove(second));
        assert_eq!(table.len(), 0);
    }
}
