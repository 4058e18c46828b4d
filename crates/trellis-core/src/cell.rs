//! Cell contracts shared by every reactive value type.
//!
//! Read access, subscription and pause/resume live on [`ReactiveCell`].
//! Writing lives on the separate [`WritableCell`] trait so that derived cells
//! such as [`Expression`](crate::Expression) simply do not expose `set`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::fault;

/// Change handler registered on a cell.
///
/// Registration is keyed by pointer identity: registering the same `Rc` twice
/// keeps a single entry, and removing an unknown handler does nothing.
pub type Handler<T> = Rc<dyn Fn(&T)>;

/// Wrap a closure into a [`Handler`].
pub fn handler<T>(f: impl Fn(&T) + 'static) -> Handler<T> {
    Rc::new(f)
}

/// Anything an ownership scope can tear down.
pub trait Destroy {
    fn destroy(&self);
}

/// Observable value container.
pub trait ReactiveCell: Destroy {
    type Value: Clone + PartialEq + 'static;

    /// Current value.
    fn get(&self) -> Self::Value;

    /// Subscribe `handler` to value changes. Idempotent.
    fn on(&self, handler: &Handler<Self::Value>);

    /// Unsubscribe `handler`. No-op if it was never registered.
    fn off(&self, handler: &Handler<Self::Value>);

    fn enable(&self);

    fn disable(&self);

    fn is_enabled(&self) -> bool;
}

/// Cell that accepts writes.
pub trait WritableCell: ReactiveCell {
    fn set(&self, value: Self::Value);
}

pub(crate) fn same_rc<A: ?Sized, B: ?Sized>(a: &Rc<A>, b: &Rc<B>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

/// Value, enabled flag and handler list shared by the concrete cell types.
pub(crate) struct CellCore<T> {
    value: RefCell<T>,
    enabled: Cell<bool>,
    handlers: RefCell<Vec<Handler<T>>>,
}

impl<T: Clone + PartialEq + 'static> CellCore<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            enabled: Cell::new(true),
            handlers: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn get(&self) -> T {
        self.value.borrow().clone()
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.value.borrow();
        f(&value)
    }

    /// Store `value`, returning whether it differed from the previous one.
    pub(crate) fn replace(&self, value: T) -> bool {
        let mut current = self.value.borrow_mut();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    pub(crate) fn set(&self, value: T, origin: &'static str) {
        if self.replace(value) && self.enabled.get() {
            self.notify(origin);
        }
    }

    pub(crate) fn notify(&self, origin: &'static str) {
        let value = self.get();
        // Snapshot so handlers may subscribe or unsubscribe while running.
        let handlers: Vec<Handler<T>> = self.handlers.borrow().clone();
        for handler in handlers {
            fault::guard(origin, || handler(&value));
        }
    }

    pub(crate) fn add_handler(&self, handler: &Handler<T>) {
        let mut handlers = self.handlers.borrow_mut();
        if !handlers.iter().any(|existing| same_rc(existing, handler)) {
            handlers.push(Rc::clone(handler));
        }
    }

    pub(crate) fn remove_handler(&self, handler: &Handler<T>) {
        self.handlers
            .borrow_mut()
            .retain(|existing| !same_rc(existing, handler));
    }

    pub(crate) fn clear_handlers(&self) {
        self.handlers.borrow_mut().clear();
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Flip the flag, returning the previous state.
    pub(crate) fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.replace(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_keeps_one_entry() {
        let core = CellCore::new(1);
        let handler: Handler<i32> = handler(|_| {});
        core.add_handler(&handler);
        core.add_handler(&handler);
        assert_eq!(core.handler_count(), 1);

        let stranger: Handler<i32> = Rc::new(|_: &i32| {});
        core.remove_handler(&stranger);
        assert_eq!(core.handler_count(), 1);

        core.remove_handler(&handler);
        assert_eq!(core.handler_count(), 0);
    }

    #[test]
    fn handler_added_during_notify_waits_for_next_wave() {
        let core = Rc::new(CellCore::new(0));
        let late_calls = Rc::new(Cell::new(0));
        let late: Handler<i32> = {
            let late_calls = Rc::clone(&late_calls);
            Rc::new(move |_: &i32| late_calls.set(late_calls.get() + 1))
        };
        let installer: Handler<i32> = {
            let core = Rc::clone(&core);
            let late = Rc::clone(&late);
            Rc::new(move |_: &i32| core.add_handler(&late))
        };
        core.add_handler(&installer);

        core.set(1, "test");
        assert_eq!(late_calls.get(), 0);
        core.set(2, "test");
        assert_eq!(late_calls.get(), 1);
    }
}
