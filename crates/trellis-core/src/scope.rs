//! Ownership scopes.
//!
//! A [`Scope`] creates cells on behalf of its owner and keeps every
//! registered [`Destroy`] collaborator alive until the scope itself is
//! destroyed. Destroying cascades to each owned item exactly once and then
//! runs the optional on-destroy callback. A second `destroy` is a no-op.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::cell::{same_rc, Destroy, ReactiveCell, WritableCell};
use crate::expression::{Expression, Sources};
use crate::mirror::{Mirror, Pointer, Source};
use crate::reference::Reference;

#[derive(Default)]
pub struct Scope {
    owned: RefCell<Vec<Rc<dyn Destroy>>>,
    on_destroy: RefCell<Option<Box<dyn FnOnce()>>>,
    destroyed: Cell<bool>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `item`.
    ///
    /// Registering into an already destroyed scope destroys the item right
    /// away so that nothing outlives its owner.
    pub fn register<D: Destroy + 'static>(&self, item: Rc<D>) -> Rc<D> {
        if self.destroyed.get() {
            item.destroy();
        } else {
            let owned: Rc<dyn Destroy> = item.clone();
            self.owned.borrow_mut().push(owned);
        }
        item
    }

    /// Hand the lifetime of `item` back to the caller. Returns `false` if the
    /// scope did not own it.
    pub fn release<D: Destroy + ?Sized>(&self, item: &Rc<D>) -> bool {
        let mut owned = self.owned.borrow_mut();
        let before = owned.len();
        owned.retain(|existing| !same_rc(existing, item));
        owned.len() != before
    }

    pub fn reference<T: Clone + PartialEq + 'static>(&self, value: T) -> Rc<Reference<T>> {
        self.register(Rc::new(Reference::new(value)))
    }

    /// Two-way mirror of `source`.
    pub fn mirror<C>(&self, source: &Rc<C>) -> Rc<Mirror<C::Value>>
    where
        C: WritableCell + 'static,
    {
        self.register(Mirror::two_way(Rc::clone(source)))
    }

    /// Read-only mirror of `source`.
    pub fn forward_mirror<C>(&self, source: &Rc<C>) -> Rc<Mirror<C::Value>>
    where
        C: ReactiveCell + 'static,
    {
        self.register(Mirror::forward(Rc::clone(source)))
    }

    pub fn pointer<T: Clone + PartialEq + 'static>(
        &self,
        source: Source<T>,
        forward_only: bool,
    ) -> Rc<Pointer<T>> {
        self.register(Rc::new(Pointer::new(source, forward_only)))
    }

    pub fn expression<T, S>(
        &self,
        func: impl Fn(&S::Values) -> T + 'static,
        sources: S,
    ) -> Rc<Expression<T, S>>
    where
        T: Clone + PartialEq + 'static,
        S: Sources,
    {
        self.register(Expression::new(func, sources))
    }

    /// Run `effect` now and again whenever one of `sources` changes.
    pub fn watch<S: Sources>(
        &self,
        sources: S,
        effect: impl Fn(&S::Values) + 'static,
    ) -> Rc<Expression<(), S>> {
        self.register(Expression::new(move |values: &S::Values| effect(values), sources))
    }

    /// Install the callback run after every owned item is destroyed.
    /// Replaces any previously installed callback.
    pub fn on_destroy(&self, callback: impl FnOnce() + 'static) {
        *self.on_destroy.borrow_mut() = Some(Box::new(callback));
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Number of items currently owned.
    pub fn len(&self) -> usize {
        self.owned.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.borrow().is_empty()
    }
}

impl Destroy for Scope {
    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        let owned = std::mem::take(&mut *self.owned.borrow_mut());
        for item in owned {
            item.destroy();
        }
        let callback = self.on_destroy.borrow_mut().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("owned", &self.len())
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/scope_tests.rs"]
mod tests;
