use std::fmt;

use crate::cell::{CellCore, Destroy, Handler, ReactiveCell, WritableCell};

const ORIGIN: &str = "Reference";

/// Mutable leaf cell.
///
/// `set` stores the new value even while disabled but only notifies handlers
/// when enabled and the value actually changed. Re-enabling rebroadcasts the
/// current value to every handler, since writes made while paused were never
/// delivered.
///
/// Propagation is synchronous and re-entrant. A handler may `set` the cell
/// that is notifying it: the nested write runs a full wave right away, after
/// which the outer wave resumes and its remaining handlers still receive the
/// value that wave started with. The last handlers to run can therefore see
/// an older value than [`get`](ReactiveCell::get) returns.
pub struct Reference<T> {
    core: CellCore<T>,
}

impl<T: Clone + PartialEq + 'static> Reference<T> {
    pub fn new(value: T) -> Self {
        Self {
            core: CellCore::new(value),
        }
    }

    /// Run `f` with a borrow of the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.core.with(f)
    }

    /// Edit a copy of the value in place and store it back.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.core.get();
        f(&mut next);
        self.set(next);
    }

    pub fn handler_count(&self) -> usize {
        self.core.handler_count()
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveCell for Reference<T> {
    type Value = T;

    fn get(&self) -> T {
        self.core.get()
    }

    fn on(&self, handler: &Handler<T>) {
        self.core.add_handler(handler);
    }

    fn off(&self, handler: &Handler<T>) {
        self.core.remove_handler(handler);
    }

    fn enable(&self) {
        if !self.core.set_enabled(true) {
            self.core.notify(ORIGIN);
        }
    }

    fn disable(&self) {
        self.core.set_enabled(false);
    }

    fn is_enabled(&self) -> bool {
        self.core.is_enabled()
    }
}

impl<T: Clone + PartialEq + 'static> WritableCell for Reference<T> {
    fn set(&self, value: T) {
        self.core.set(value, ORIGIN);
    }
}

impl<T: Clone + PartialEq + 'static> Destroy for Reference<T> {
    fn destroy(&self) {
        self.core.clear_handlers();
    }
}

impl<T: fmt::Debug + Clone + PartialEq + 'static> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("value", &self.core.get())
            .field("enabled", &self.core.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::handler;
    use crate::fault::{reset_error_reporter, set_error_reporter, HandlerFault};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn panicking_handler_is_reported_and_siblings_still_run() {
        let faults: Rc<RefCell<Vec<HandlerFault>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&faults);
        set_error_reporter(move |fault: &HandlerFault| sink.borrow_mut().push(fault.clone()));

        let cell = Reference::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let failing: Handler<i32> = handler(|_: &i32| panic!("bad handler"));
        let recorder: Handler<i32> = {
            let seen = Rc::clone(&seen);
            handler(move |value: &i32| seen.borrow_mut().push(*value))
        };
        cell.on(&failing);
        cell.on(&recorder);

        cell.set(5);
        reset_error_reporter();

        assert_eq!(*seen.borrow(), vec![5]);
        let faults = faults.borrow();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].origin, "Reference");
        assert_eq!(faults[0].message, "bad handler");
        assert_eq!(cell.get(), 5);
    }

    #[test]
    fn nested_set_leaves_later_handlers_with_the_outer_value() {
        let cell = Rc::new(Reference::new(0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let bump: Handler<i32> = {
            let cell = Rc::clone(&cell);
            handler(move |value: &i32| {
                if *value == 1 {
                    cell.set(2);
                }
            })
        };
        let recorder: Handler<i32> = {
            let seen = Rc::clone(&seen);
            handler(move |value: &i32| seen.borrow_mut().push(*value))
        };
        cell.on(&bump);
        cell.on(&recorder);

        cell.set(1);
        assert_eq!(*seen.borrow(), vec![2, 1]);
        assert_eq!(cell.get(), 2);
    }
}
