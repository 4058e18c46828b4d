//! Adapters writing a cell's value into a host node.
//!
//! Each binding applies the current value once, then again on every change.
//! The subscription is owned by the bound fragment's scope and is dropped
//! when the fragment is destroyed.

use std::fmt;
use std::rc::Rc;

use trellis_core::{Destroy, Handler, ReactiveCell};

use crate::error::TreeError;
use crate::fragment::Fragment;
use crate::tree::Tree;

/// Subscription of one adapter to one cell.
struct Binding<T> {
    cell: Rc<dyn ReactiveCell<Value = T>>,
    handler: Handler<T>,
}

impl<T: Clone + PartialEq + 'static> Destroy for Binding<T> {
    fn destroy(&self) {
        self.cell.off(&self.handler);
    }
}

fn bind<T: Clone + PartialEq + 'static>(
    fragment: &Fragment,
    cell: Rc<dyn ReactiveCell<Value = T>>,
    apply: impl Fn(&Tree, &T) + 'static,
) {
    apply(fragment.tree(), &cell.get());
    let tree = fragment.tree().downgrade();
    let handler: Handler<T> = Rc::new(move |value: &T| {
        if let Some(inner) = tree.upgrade() {
            apply(&Tree::from_inner(inner), value);
        }
    });
    cell.on(&handler);
    fragment.scope().register(Rc::new(Binding { cell, handler }));
}

impl Fragment {
    /// Text child showing the current value of `cell`.
    pub fn text_cell<C>(&self, cell: &Rc<C>) -> Fragment
    where
        C: ReactiveCell + 'static,
        C::Value: fmt::Display,
    {
        let child = self.text("");
        if let Some(node) = child.host_node() {
            let cell: Rc<dyn ReactiveCell<Value = C::Value>> = cell.clone();
            bind(&child, cell, move |tree, value| {
                let text = value.to_string();
                tree.execute(move |host| host.set_text(node, &text));
            });
        }
        child
    }

    pub fn bind_attribute<C>(&self, name: &str, cell: &Rc<C>) -> Result<(), TreeError>
    where
        C: ReactiveCell<Value = String> + 'static,
    {
        let node = self.element_node()?;
        let name = name.to_string();
        let cell: Rc<dyn ReactiveCell<Value = String>> = cell.clone();
        bind(self, cell, move |tree, value| {
            let name = name.clone();
            let value = value.clone();
            tree.execute(move |host| host.set_attribute(node, &name, Some(value.as_str())));
        });
        Ok(())
    }

    pub fn bind_class<C>(&self, class: &str, cell: &Rc<C>) -> Result<(), TreeError>
    where
        C: ReactiveCell<Value = bool> + 'static,
    {
        let node = self.element_node()?;
        let class = class.to_string();
        let cell: Rc<dyn ReactiveCell<Value = bool>> = cell.clone();
        bind(self, cell, move |tree, enabled| {
            let class = class.clone();
            let enabled = *enabled;
            tree.execute(move |host| host.set_class(node, &class, enabled));
        });
        Ok(())
    }

    /// An empty value removes the property.
    pub fn bind_style<C>(&self, property: &str, cell: &Rc<C>) -> Result<(), TreeError>
    where
        C: ReactiveCell<Value = String> + 'static,
    {
        let node = self.element_node()?;
        let property = property.to_string();
        let cell: Rc<dyn ReactiveCell<Value = String>> = cell.clone();
        bind(self, cell, move |tree, value| {
            let property = property.clone();
            let value = (!value.is_empty()).then(|| value.clone());
            tree.execute(move |host| host.set_style(node, &property, value.as_deref()));
        });
        Ok(())
    }

    /// Detach the element while `cell` is false and reattach it at its
    /// logical position when it turns true.
    pub fn bind_visible<C>(&self, cell: &Rc<C>) -> Result<(), TreeError>
    where
        C: ReactiveCell<Value = bool> + 'static,
    {
        self.element_node()?;
        let id = self.id();
        let cell: Rc<dyn ReactiveCell<Value = bool>> = cell.clone();
        bind(self, cell, move |tree, visible| tree.set_mounted(id, *visible));
        Ok(())
    }
}
