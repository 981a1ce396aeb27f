//! Pointer listeners attached to the rendering surface.
//!
//! Listeners are a scoped resource: [`ListenerRegistry::attach`] hands out
//! an [`AttachedListeners`] guard and dropping the guard detaches them.
//! Reloading the surface detaches everything at once (the old body is
//! gone); guards from before the reload then drop as no-ops.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    PointerOver,
    PointerOut,
    Click,
}

#[derive(Debug, Default)]
struct Registry {
    counts: RefCell<BTreeMap<ListenerKind, usize>>,
    generation: Cell<u64>,
}

/// Listener bookkeeping for one surface. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<Registry>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, kinds: &[ListenerKind]) -> AttachedListeners {
        let mut counts = self.inner.counts.borrow_mut();
        for &kind in kinds {
            *counts.entry(kind).or_insert(0) += 1;
        }
        AttachedListeners {
            registry: self.clone(),
            kinds: kinds.to_vec(),
            generation: self.inner.generation.get(),
        }
    }

    pub fn is_attached(&self, kind: ListenerKind) -> bool {
        self.inner
            .counts
            .borrow()
            .get(&kind)
            .is_some_and(|&count| count > 0)
    }

    pub fn attached(&self) -> Vec<ListenerKind> {
        self.inner
            .counts
            .borrow()
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&kind, _)| kind)
            .collect()
    }

    /// Drop every listener, invalidating outstanding guards.
    pub fn detach_all(&self) {
        self.inner.counts.borrow_mut().clear();
        self.inner.generation.set(self.inner.generation.get() + 1);
    }

    fn release(&self, kinds: &[ListenerKind], generation: u64) {
        if generation != self.inner.generation.get() {
            return;
        }
        let mut counts = self.inner.counts.borrow_mut();
        for kind in kinds {
            if let Some(count) = counts.get_mut(kind) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    counts.remove(kind);
                }
            }
        }
    }
}

/// Guard for a set of attached listeners.
#[derive(Debug)]
pub struct AttachedListeners {
    registry: ListenerRegistry,
    kinds: Vec<ListenerKind>,
    generation: u64,
}

impl AttachedListeners {
    pub fn kinds(&self) -> &[ListenerKind] {
        &self.kinds
    }

    /// False once the surface has been reloaded under this guard.
    pub fn is_live(&self) -> bool {
        self.generation == self.registry.inner.generation.get()
    }
}

impl Drop for AttachedListeners {
    fn drop(&mut self) {
        self.registry.release(&self.kinds, self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_detaches() {
        let registry = ListenerRegistry::new();
        let guard = registry.attach(&[ListenerKind::PointerOver, ListenerKind::Click]);
        assert!(registry.is_attached(ListenerKind::Click));
        drop(guard);
        assert!(registry.attached().is_empty());
    }

    #[test]
    fn test_stale_guard_does_not_detach_new_listeners() {
        let registry = ListenerRegistry::new();
        let stale = registry.attach(&[ListenerKind::Click]);
        registry.detach_all();
        assert!(!stale.is_live());

        let fresh = registry.attach(&[ListenerKind::Click]);
        drop(stale);
        assert!(registry.is_attached(ListenerKind::Click));
        drop(fresh);
        assert!(!registry.is_attached(ListenerKind::Click));
    }
}
