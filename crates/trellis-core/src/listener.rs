//! Structural add/remove notifications for collections.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cell::{same_rc, Destroy};
use crate::fault;

const ORIGIN: &str = "Listener";

/// Handler invoked with `(key, value)` for one structural event.
pub type ListenerHandler<K, V> = Rc<dyn Fn(&K, &V)>;

/// Independent add and remove handler sets.
///
/// There is no ordering guarantee between different listeners; within one
/// listener handlers run in registration order.
pub struct Listener<K, V> {
    on_add: RefCell<Vec<ListenerHandler<K, V>>>,
    on_remove: RefCell<Vec<ListenerHandler<K, V>>>,
}

impl<K: 'static, V: 'static> Listener<K, V> {
    pub fn new() -> Self {
        Self {
            on_add: RefCell::new(Vec::new()),
            on_remove: RefCell::new(Vec::new()),
        }
    }

    pub fn on_add(&self, handler: &ListenerHandler<K, V>) {
        register(&self.on_add, handler);
    }

    pub fn on_remove(&self, handler: &ListenerHandler<K, V>) {
        register(&self.on_remove, handler);
    }

    pub fn off_add(&self, handler: &ListenerHandler<K, V>) {
        self.on_add
            .borrow_mut()
            .retain(|existing| !same_rc(existing, handler));
    }

    pub fn off_remove(&self, handler: &ListenerHandler<K, V>) {
        self.on_remove
            .borrow_mut()
            .retain(|existing| !same_rc(existing, handler));
    }

    pub fn emit_added(&self, key: &K, value: &V) {
        emit(&self.on_add, key, value);
    }

    pub fn emit_removed(&self, key: &K, value: &V) {
        emit(&self.on_remove, key, value);
    }

    pub fn handler_count(&self) -> usize {
        self.on_add.borrow().len() + self.on_remove.borrow().len()
    }

    pub fn clear(&self) {
        self.on_add.borrow_mut().clear();
        self.on_remove.borrow_mut().clear();
    }
}

impl<K: 'static, V: 'static> Default for Listener<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: 'static, V: 'static> Destroy for Listener<K, V> {
    fn destroy(&self) {
        self.clear();
    }
}

fn register<K, V>(set: &RefCell<Vec<ListenerHandler<K, V>>>, handler: &ListenerHandler<K, V>) {
    let mut handlers = set.borrow_mut();
    if !handlers.iter().any(|existing| same_rc(existing, handler)) {
        handlers.push(Rc::clone(handler));
    }
}

fn emit<K, V>(set: &RefCell<Vec<ListenerHandler<K, V>>>, key: &K, value: &V) {
    let handlers: Vec<ListenerHandler<K, V>> = set.borrow().clone();
    for handler in handlers {
        fault::guard(ORIGIN, || handler(key, value));
    }
}
