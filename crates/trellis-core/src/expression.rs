//! N-ary computed cells.
//!
//! An [`Expression`] keeps a cache holding the last value seen from each
//! source. When source `i` notifies, only slot `i` of the cache is updated
//! before the combinator runs again; sources that have not notified are never
//! re-read mid-propagation.
//!
//! Unlike [`Reference`], disabling an expression also unsubscribes it from all
//! of its sources. Enabling resubscribes, refreshes the whole cache from the
//! live source values and recomputes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::cell::{Destroy, Handler, ReactiveCell, WritableCell};
use crate::reference::Reference;

/// Callback through which a source handler patches the cache and triggers a
/// recomputation.
pub type Recompute<V> = Rc<dyn Fn(&dyn Fn(&mut V))>;

/// Ordered set of dependency cells.
///
/// Implemented for tuples of one to six `Rc` cells of any value types and for
/// a `Vec` of cells sharing one value type.
pub trait Sources: 'static {
    type Values: Clone + 'static;
    type Links: 'static;

    /// Read every source's current value.
    fn values(&self) -> Self::Values;

    /// Build one handler per source, each writing its own cache slot.
    fn link(&self, update: &Recompute<Self::Values>) -> Self::Links;

    fn subscribe(&self, links: &Self::Links);

    fn unsubscribe(&self, links: &Self::Links);
}

macro_rules! impl_sources_for_tuple {
    ($($cell:ident $index:tt),+) => {
        impl<$($cell),+> Sources for ($(Rc<$cell>,)+)
        where
            $($cell: ReactiveCell + ?Sized + 'static,)+
        {
            type Values = ($($cell::Value,)+);
            type Links = ($(Handler<$cell::Value>,)+);

            fn values(&self) -> Self::Values {
                ($(self.$index.get(),)+)
            }

            fn link(&self, update: &Recompute<Self::Values>) -> Self::Links {
                ($({
                    let update = Rc::clone(update);
                    let handler: Handler<$cell::Value> = Rc::new(move |value: &$cell::Value| {
                        update(&|cache: &mut Self::Values| cache.$index = value.clone());
                    });
                    handler
                },)+)
            }

            fn subscribe(&self, links: &Self::Links) {
                $(self.$index.on(&links.$index);)+
            }

            fn unsubscribe(&self, links: &Self::Links) {
                $(self.$index.off(&links.$index);)+
            }
        }
    };
}

impl_sources_for_tuple!(A 0);
impl_sources_for_tuple!(A 0, B 1);
impl_sources_for_tuple!(A 0, B 1, C 2);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);

impl<C> Sources for Vec<Rc<C>>
where
    C: ReactiveCell + ?Sized + 'static,
{
    type Values = Vec<C::Value>;
    type Links = Vec<Handler<C::Value>>;

    fn values(&self) -> Self::Values {
        self.iter().map(|cell| cell.get()).collect()
    }

    fn link(&self, update: &Recompute<Self::Values>) -> Self::Links {
        (0..self.len())
            .map(|index| {
                let update = Rc::clone(update);
                let handler: Handler<C::Value> = Rc::new(move |value: &C::Value| {
                    update(&|cache: &mut Vec<C::Value>| cache[index] = value.clone());
                });
                handler
            })
            .collect()
    }

    fn subscribe(&self, links: &Self::Links) {
        for (cell, link) in self.iter().zip(links) {
            cell.on(link);
        }
    }

    fn unsubscribe(&self, links: &Self::Links) {
        for (cell, link) in self.iter().zip(links) {
            cell.off(link);
        }
    }
}

/// Computed cell: `f(s1, .., sn)` kept up to date push-style.
pub struct Expression<T, S: Sources> {
    sources: S,
    func: Box<dyn Fn(&S::Values) -> T>,
    cache: RefCell<Option<S::Values>>,
    links: RefCell<Option<S::Links>>,
    sync: Reference<T>,
    enabled: Cell<bool>,
}

impl<T, S> Expression<T, S>
where
    T: Clone + PartialEq + 'static,
    S: Sources,
{
    pub fn new(func: impl Fn(&S::Values) -> T + 'static, sources: S) -> Rc<Self> {
        let expression = Rc::new_cyclic(|weak: &Weak<Self>| {
            let values = sources.values();
            let sync = Reference::new(func(&values));
            let weak = weak.clone();
            let update: Recompute<S::Values> = Rc::new(move |apply: &dyn Fn(&mut S::Values)| {
                if let Some(expression) = weak.upgrade() {
                    expression.recompute_with(apply);
                }
            });
            let links = sources.link(&update);
            Self {
                sources,
                func: Box::new(func),
                cache: RefCell::new(Some(values)),
                links: RefCell::new(Some(links)),
                sync,
                enabled: Cell::new(true),
            }
        });
        expression.subscribe();
        expression
    }

    /// Last values seen from the sources, `None` once destroyed.
    pub fn cached_values(&self) -> Option<S::Values> {
        self.cache.borrow().clone()
    }

    pub fn sources(&self) -> &S {
        &self.sources
    }

    fn recompute_with(&self, apply: &dyn Fn(&mut S::Values)) {
        let values = {
            let mut cache = self.cache.borrow_mut();
            let Some(values) = cache.as_mut() else {
                return;
            };
            apply(values);
            values.clone()
        };
        // The cache is released first so `func` may write to a source.
        let next = (self.func)(&values);
        self.sync.set(next);
    }

    fn subscribe(&self) {
        if let Some(links) = self.links.borrow().as_ref() {
            self.sources.subscribe(links);
        }
    }

    fn unsubscribe(&self) {
        if let Some(links) = self.links.borrow().as_ref() {
            self.sources.unsubscribe(links);
        }
    }
}

impl<T, S> ReactiveCell for Expression<T, S>
where
    T: Clone + PartialEq + 'static,
    S: Sources,
{
    type Value = T;

    fn get(&self) -> T {
        self.sync.get()
    }

    fn on(&self, handler: &Handler<T>) {
        self.sync.on(handler);
    }

    fn off(&self, handler: &Handler<T>) {
        self.sync.off(handler);
    }

    fn enable(&self) {
        if self.enabled.get() || self.links.borrow().is_none() {
            return;
        }
        self.enabled.set(true);
        self.subscribe();
        let values = self.sources.values();
        let next = (self.func)(&values);
        *self.cache.borrow_mut() = Some(values);
        self.sync.set(next);
    }

    fn disable(&self) {
        if !self.enabled.replace(false) {
            return;
        }
        self.unsubscribe();
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

impl<T, S> Destroy for Expression<T, S>
where
    T: Clone + PartialEq + 'static,
    S: Sources,
{
    fn destroy(&self) {
        self.disable();
        self.links.borrow_mut().take();
        self.cache.borrow_mut().take();
        self.sync.destroy();
    }
}

impl<T, S> fmt::Debug for Expression<T, S>
where
    T: fmt::Debug + Clone + PartialEq + 'static,
    S: Sources,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("value", &self.sync.get())
            .field("enabled", &self.enabled.get())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/expression_tests.rs"]
mod tests;
