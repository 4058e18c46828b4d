use std::rc::Rc;

use trellis_core::Destroy;

use crate::fragment::Fragment;
use crate::tree::NodeKind;

/// Reusable piece of UI with a build and teardown lifecycle.
///
/// `compose` builds the content into the fragment it is given. `ready` runs
/// once the content exists, and `dispose` runs when that fragment is
/// destroyed, before its children are torn down.
pub trait Component: 'static {
    fn compose(&self, fragment: &Fragment);

    fn ready(&self, _fragment: &Fragment) {}

    fn dispose(&self) {}
}

struct Mounted<C: Component> {
    component: C,
}

impl<C: Component> Destroy for Mounted<C> {
    fn destroy(&self) {
        self.component.dispose();
    }
}

impl Fragment {
    /// Run `component` inside a fresh non-owning child fragment.
    pub fn component<C: Component>(&self, component: C) -> Fragment {
        let child = self.child(NodeKind::Plain, "component");
        let mounted = child.scope().register(Rc::new(Mounted { component }));
        mounted.component.compose(&child);
        mounted.component.ready(&child);
        child
    }
}
