use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;

use crate::cell::Destroy;
use crate::collections::OrderedSet;
use crate::listener::Listener;

/// Insertion-ordered set. Events carry the member as both key and value.
pub struct SetModel<T> {
    members: RefCell<OrderedSet<T>>,
    listener: Listener<T, T>,
}

impl<T: Hash + Eq + Clone + 'static> SetModel<T> {
    pub fn new() -> Self {
        Self {
            members: RefCell::new(OrderedSet::default()),
            listener: Listener::new(),
        }
    }

    pub fn listener(&self) -> &Listener<T, T> {
        &self.listener
    }

    /// Add `value`; returns `false` and emits nothing if already present.
    pub fn add(&self, value: T) -> bool {
        let inserted = self.members.borrow_mut().insert(value.clone());
        if inserted {
            self.listener.emit_added(&value, &value);
        }
        inserted
    }

    pub fn delete(&self, value: &T) -> bool {
        let removed = self.members.borrow_mut().shift_remove(value);
        if removed {
            self.listener.emit_removed(value, value);
        }
        removed
    }

    pub fn has(&self, value: &T) -> bool {
        self.members.borrow().contains(value)
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.members.borrow().iter().cloned().collect()
    }

    pub fn clear(&self) {
        let drained: Vec<T> = self.members.borrow_mut().drain(..).collect();
        for value in &drained {
            self.listener.emit_removed(value, value);
        }
    }
}

impl<T: Hash + Eq + Clone + 'static> Default for SetModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq + Clone + 'static> Destroy for SetModel<T> {
    fn destroy(&self) {
        self.listener.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for SetModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members.borrow().iter()).finish()
    }
}
