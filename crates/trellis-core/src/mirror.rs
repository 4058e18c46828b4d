//! Cells that copy the value of another cell.
//!
//! A [`Mirror`] subscribes a private resync handler to its source. While
//! enabled it is subscribed; `disable` unsubscribes and `enable` resubscribes
//! and pulls the source value. A [`Pointer`] owns a mirror and can swap the
//! source at runtime.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::cell::{same_rc, CellCore, Destroy, Handler, ReactiveCell, WritableCell};

const ORIGIN: &str = "Mirror";

/// Cell a mirror copies from.
///
/// Only a [`Source::Writable`] source can receive write-back from a mirror.
pub enum Source<T> {
    Readable(Rc<dyn ReactiveCell<Value = T>>),
    Writable(Rc<dyn WritableCell<Value = T>>),
}

impl<T: Clone + PartialEq + 'static> Source<T> {
    pub fn readable<C>(cell: Rc<C>) -> Self
    where
        C: ReactiveCell<Value = T> + 'static,
    {
        Source::Readable(cell)
    }

    pub fn writable<C>(cell: Rc<C>) -> Self
    where
        C: WritableCell<Value = T> + 'static,
    {
        Source::Writable(cell)
    }

    pub fn get(&self) -> T {
        match self {
            Source::Readable(cell) => cell.get(),
            Source::Writable(cell) => cell.get(),
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, Source::Writable(_))
    }

    fn on(&self, handler: &Handler<T>) {
        match self {
            Source::Readable(cell) => cell.on(handler),
            Source::Writable(cell) => cell.on(handler),
        }
    }

    fn off(&self, handler: &Handler<T>) {
        match self {
            Source::Readable(cell) => cell.off(handler),
            Source::Writable(cell) => cell.off(handler),
        }
    }

    fn write(&self, value: T) {
        if let Source::Writable(cell) = self {
            cell.set(value);
        }
    }

    fn same(&self, other: &Source<T>) -> bool {
        match (self, other) {
            (Source::Readable(a), Source::Readable(b)) => same_rc(a, b),
            (Source::Writable(a), Source::Writable(b)) => same_rc(a, b),
            (Source::Readable(a), Source::Writable(b))
            | (Source::Writable(b), Source::Readable(a)) => same_rc(a, b),
        }
    }
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        match self {
            Source::Readable(cell) => Source::Readable(Rc::clone(cell)),
            Source::Writable(cell) => Source::Writable(Rc::clone(cell)),
        }
    }
}

/// Cell that follows another cell's value.
///
/// With `forward_only == false` and a writable source, writes to the mirror
/// are propagated back to the source.
pub struct Mirror<T> {
    core: CellCore<T>,
    source: RefCell<Source<T>>,
    resync: Handler<T>,
    forward_only: bool,
}

impl<T: Clone + PartialEq + 'static> Mirror<T> {
    pub fn new(source: Source<T>, forward_only: bool) -> Rc<Self> {
        let mirror = Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let resync: Handler<T> = Rc::new(move |value: &T| {
                if let Some(mirror) = weak.upgrade() {
                    mirror.core.set(value.clone(), ORIGIN);
                }
            });
            Self {
                core: CellCore::new(source.get()),
                source: RefCell::new(source),
                resync,
                forward_only,
            }
        });
        mirror.current_source().on(&mirror.resync);
        mirror
    }

    /// Read-only copy of `source`.
    pub fn forward<C>(source: Rc<C>) -> Rc<Self>
    where
        C: ReactiveCell<Value = T> + 'static,
    {
        Self::new(Source::readable(source), true)
    }

    /// Bidirectional copy: writes to the mirror also write `source`.
    pub fn two_way<C>(source: Rc<C>) -> Rc<Self>
    where
        C: WritableCell<Value = T> + 'static,
    {
        Self::new(Source::writable(source), false)
    }

    pub fn is_forward_only(&self) -> bool {
        self.forward_only || !self.current_source().is_writable()
    }

    pub fn current_source(&self) -> Source<T> {
        self.source.borrow().clone()
    }

    /// Swap the source. Returns `false` if `next` already is the source.
    pub(crate) fn repoint(&self, next: Source<T>) -> bool {
        if self.source.borrow().same(&next) {
            return false;
        }
        let previous = self.source.replace(next.clone());
        if self.core.is_enabled() {
            previous.off(&self.resync);
            next.on(&self.resync);
            self.core.set(next.get(), ORIGIN);
        }
        true
    }

    pub fn handler_count(&self) -> usize {
        self.core.handler_count()
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveCell for Mirror<T> {
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
        if self.core.set_enabled(true) {
            return;
        }
        let source = self.current_source();
        source.on(&self.resync);
        self.core.set(source.get(), ORIGIN);
    }

    fn disable(&self) {
        if self.core.set_enabled(false) {
            self.current_source().off(&self.resync);
        }
    }

    fn is_enabled(&self) -> bool {
        self.core.is_enabled()
    }
}

impl<T: Clone + PartialEq + 'static> WritableCell for Mirror<T> {
    fn set(&self, value: T) {
        if !self.forward_only {
            self.current_source().write(value.clone());
        }
        self.core.set(value, ORIGIN);
    }
}

impl<T: Clone + PartialEq + 'static> Destroy for Mirror<T> {
    fn destroy(&self) {
        self.current_source().off(&self.resync);
        self.core.clear_handlers();
    }
}

impl<T: fmt::Debug + Clone + PartialEq + 'static> fmt::Debug for Mirror<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mirror")
            .field("value", &self.core.get())
            .field("forward_only", &self.forward_only)
            .field("enabled", &self.core.is_enabled())
            .finish()
    }
}

/// Re-bindable mirror.
pub struct Pointer<T> {
    mirror: Rc<Mirror<T>>,
}

impl<T: Clone + PartialEq + 'static> Pointer<T> {
    pub fn new(source: Source<T>, forward_only: bool) -> Self {
        Self {
            mirror: Mirror::new(source, forward_only),
        }
    }

    /// Unsubscribe from the current source, follow `source` and resync.
    ///
    /// A disabled pointer only records the new source; it subscribes and
    /// resyncs when enabled again.
    pub fn point(&self, source: Source<T>) -> bool {
        self.mirror.repoint(source)
    }

    pub fn current_source(&self) -> Source<T> {
        self.mirror.current_source()
    }

    pub fn is_forward_only(&self) -> bool {
        self.mirror.is_forward_only()
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveCell for Pointer<T> {
    type Value = T;

    fn get(&self) -> T {
        self.mirror.get()
    }

    fn on(&self, handler: &Handler<T>) {
        self.mirror.on(handler);
    }

    fn off(&self, handler: &Handler<T>) {
        self.mirror.off(handler);
    }

    fn enable(&self) {
        self.mirror.enable();
    }

    fn disable(&self) {
        self.mirror.disable();
    }

    fn is_enabled(&self) -> bool {
        self.mirror.is_enabled()
    }
}

impl<T: Clone + PartialEq + 'static> WritableCell for Pointer<T> {
    fn set(&self, value: T) {
        self.mirror.set(value);
    }
}

impl<T: Clone + PartialEq + 'static> Destroy for Pointer<T> {
    fn destroy(&self) {
        self.mirror.destroy();
    }
}

impl<T: fmt::Debug + Clone + PartialEq + 'static> fmt::Debug for Pointer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pointer")
            .field("mirror", &self.mirror)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/mirror_tests.rs"]
mod tests;
