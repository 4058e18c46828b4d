//! Keyed views: one child fragment per live element of a model.
//!
//! A view subscribes to the model's [`Listener`] and mirrors every add and
//! remove event onto its container fragment. There is no diffing: the view
//! trusts the event stream. Array models carry the id of the element that
//! follows an insertion so new children land in the middle when needed;
//! every other model appends.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use trellis_core::collections::map::HashMap;
use trellis_core::{
    ArrayKey, ArrayModel, Destroy, ItemId, Listener, ListenerHandler, MapModel, ObjectModel,
    SetModel,
};

use crate::fragment::{Fragment, WeakFragment};
use crate::tree::{FragmentId, NodeKind};

/// A collection a keyed view can follow.
pub trait KeyedSource: 'static {
    /// Key as carried by the listener events.
    type EventKey: 'static;
    /// Identity of one child in the view.
    type Key: Hash + Eq + Clone + fmt::Debug + 'static;
    type Value: Clone + 'static;

    fn listener(&self) -> &Listener<Self::EventKey, Self::Value>;

    /// Current contents in iteration order.
    fn snapshot(&self) -> Vec<(Self::EventKey, Self::Value)>;

    fn key_of(event: &Self::EventKey) -> Self::Key;

    /// Key of the child a new child must precede. `None` appends.
    fn anchor_of(_event: &Self::EventKey) -> Option<Self::Key> {
        None
    }
}

impl<T: Clone + 'static> KeyedSource for ArrayModel<T> {
    type EventKey = ArrayKey;
    type Key = ItemId;
    type Value = T;

    fn listener(&self) -> &Listener<ArrayKey, T> {
        ArrayModel::listener(self)
    }

    fn snapshot(&self) -> Vec<(ArrayKey, T)> {
        ArrayModel::snapshot(self)
    }

    fn key_of(event: &ArrayKey) -> ItemId {
        event.id
    }

    fn anchor_of(event: &ArrayKey) -> Option<ItemId> {
        event.before
    }
}

impl<K, V> KeyedSource for MapModel<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug + 'static,
    V: Clone + 'static,
{
    type EventKey = K;
    type Key = K;
    type Value = V;

    fn listener(&self) -> &Listener<K, V> {
        MapModel::listener(self)
    }

    fn snapshot(&self) -> Vec<(K, V)> {
        MapModel::snapshot(self)
    }

    fn key_of(event: &K) -> K {
        event.clone()
    }
}

impl<T> KeyedSource for SetModel<T>
where
    T: Hash + Eq + Clone + fmt::Debug + 'static,
{
    type EventKey = T;
    type Key = T;
    type Value = T;

    fn listener(&self) -> &Listener<T, T> {
        SetModel::listener(self)
    }

    fn snapshot(&self) -> Vec<(T, T)> {
        self.to_vec()
            .into_iter()
            .map(|member| (member.clone(), member))
            .collect()
    }

    fn key_of(event: &T) -> T {
        event.clone()
    }
}

impl<V: Clone + 'static> KeyedSource for ObjectModel<V> {
    type EventKey = String;
    type Key = String;
    type Value = V;

    fn listener(&self) -> &Listener<String, V> {
        ObjectModel::listener(self)
    }

    fn snapshot(&self) -> Vec<(String, V)> {
        ObjectModel::snapshot(self)
    }

    fn key_of(event: &String) -> String {
        event.clone()
    }
}

type ItemBuilder<S> =
    Rc<dyn Fn(&Fragment, &<S as KeyedSource>::Value, &<S as KeyedSource>::Key)>;

/// Key to child fragment mapping kept in step with a model.
///
/// A second add for a key that already has a child replaces that child: the
/// old fragment is destroyed and a new one is built in its place.
pub struct KeyedView<S: KeyedSource> {
    model: Rc<S>,
    container: WeakFragment,
    children: RefCell<HashMap<S::Key, FragmentId>>,
    builder: ItemBuilder<S>,
    on_add: ListenerHandler<S::EventKey, S::Value>,
    on_remove: ListenerHandler<S::EventKey, S::Value>,
}

impl<S: KeyedSource> KeyedView<S> {
    fn new(model: Rc<S>, container: WeakFragment, builder: ItemBuilder<S>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let added = weak.clone();
            let on_add: ListenerHandler<S::EventKey, S::Value> =
                Rc::new(move |event: &S::EventKey, value: &S::Value| {
                    if let Some(view) = added.upgrade() {
                        view.add(event, value);
                    }
                });
            let removed = weak.clone();
            let on_remove: ListenerHandler<S::EventKey, S::Value> =
                Rc::new(move |event: &S::EventKey, _: &S::Value| {
                    if let Some(view) = removed.upgrade() {
                        view.remove(&S::key_of(event));
                    }
                });
            Self {
                model,
                container,
                children: RefCell::new(HashMap::default()),
                builder,
                on_add,
                on_remove,
            }
        })
    }

    /// Subscribe, then replay the current contents as adds.
    fn attach(&self) {
        let listener = self.model.listener();
        listener.on_add(&self.on_add);
        listener.on_remove(&self.on_remove);
        for (event, value) in self.model.snapshot() {
            self.add(&event, &value);
        }
    }

    fn add(&self, event: &S::EventKey, value: &S::Value) {
        let Some(container) = self.container.upgrade() else {
            return;
        };
        let key = S::key_of(event);
        self.remove(&key);

        let anchor = S::anchor_of(event)
            .and_then(|anchor| self.children.borrow().get(&anchor).copied());
        let child = match anchor {
            Some(anchor) => container.child_before(anchor, "item"),
            None => container.child(NodeKind::Plain, "item"),
        };
        log::trace!("keyed view {}: add {:?} as {}", container.id(), key, child.id());
        self.children.borrow_mut().insert(key.clone(), child.id());
        (self.builder)(&child, value, &key);
    }

    fn remove(&self, key: &S::Key) {
        let Some(id) = self.children.borrow_mut().remove(key) else {
            return;
        };
        log::trace!("keyed view {}: remove {:?}", self.container.id(), key);
        if let Some(container) = self.container.upgrade() {
            container.tree().destroy(id);
        }
    }

    pub fn model(&self) -> &Rc<S> {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Child fragment built for `key`.
    pub fn child(&self, key: &S::Key) -> Option<Fragment> {
        let id = *self.children.borrow().get(key)?;
        self.container.upgrade()?.tree().fragment(id).ok()
    }
}

impl<S: KeyedSource> Destroy for KeyedView<S> {
    fn destroy(&self) {
        let listener = self.model.listener();
        listener.off_add(&self.on_add);
        listener.off_remove(&self.on_remove);
        self.children.borrow_mut().clear();
    }
}

impl<S: KeyedSource> fmt::Debug for KeyedView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedView")
            .field("container", &self.container)
            .field("children", &self.len())
            .finish()
    }
}

impl Fragment {
    /// Render one child per element of `model`, kept in step with its
    /// add/remove events.
    ///
    /// `build` receives the child fragment, the element and its key. The
    /// view and its subscription live as long as the returned fragment.
    pub fn repeat<S, F>(&self, model: &Rc<S>, build: F) -> Fragment
    where
        S: KeyedSource,
        F: Fn(&Fragment, &S::Value, &S::Key) + 'static,
    {
        self.keyed_view(model, build).0
    }

    /// Like [`repeat`](Self::repeat), also returning the view.
    pub fn keyed_view<S, F>(&self, model: &Rc<S>, build: F) -> (Fragment, Rc<KeyedView<S>>)
    where
        S: KeyedSource,
        F: Fn(&Fragment, &S::Value, &S::Key) + 'static,
    {
        let container = self.child(NodeKind::Plain, "repeat");
        let view = KeyedView::new(Rc::clone(model), container.downgrade(), Rc::new(build));
        container.scope().register(Rc::clone(&view));
        view.attach();
        (container, view)
    }
}

#[cfg(test)]
#[path = "tests/keyed_tests.rs"]
mod tests;
