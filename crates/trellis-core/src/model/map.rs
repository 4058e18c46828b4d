use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;

use crate::cell::Destroy;
use crate::collections::OrderedMap;
use crate::listener::Listener;

/// Insertion-ordered key/value collection emitting keyed events.
pub struct MapModel<K, V> {
    entries: RefCell<OrderedMap<K, V>>,
    listener: Listener<K, V>,
}

impl<K, V> MapModel<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(OrderedMap::default()),
            listener: Listener::new(),
        }
    }

    pub fn listener(&self) -> &Listener<K, V> {
        &self.listener
    }

    /// Insert or replace. A replaced key keeps its position and emits
    /// remove(old) followed by add(new).
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let previous = self
            .entries
            .borrow_mut()
            .insert(key.clone(), value.clone());
        if let Some(old) = &previous {
            self.listener.emit_removed(&key, old);
        }
        self.listener.emit_added(&key, &value);
        previous
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = self.entries.borrow_mut().shift_remove(key);
        if let Some(value) = &removed {
            self.listener.emit_removed(key, value);
        }
        removed
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn keys(&self) -> Vec<K> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Current entries in insertion order.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.entries
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn clear(&self) {
        let drained: Vec<(K, V)> = self.entries.borrow_mut().drain(..).collect();
        for (key, value) in &drained {
            self.listener.emit_removed(key, value);
        }
    }
}

impl<K, V> Default for MapModel<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Destroy for MapModel<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    fn destroy(&self) {
        self.listener.clear();
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MapModel<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.borrow().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::ListenerHandler;
    use std::rc::Rc;

    #[test]
    fn replace_emits_remove_then_add_in_place() {
        let model: MapModel<&'static str, i32> = MapModel::new();
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let added: ListenerHandler<&'static str, i32> =
            Rc::new(move |key: &&'static str, value: &i32| sink.borrow_mut().push(format!("+{key}={value}")));
        let sink = Rc::clone(&log);
        let removed: ListenerHandler<&'static str, i32> =
            Rc::new(move |key: &&'static str, value: &i32| sink.borrow_mut().push(format!("-{key}={value}")));
        model.listener().on_add(&added);
        model.listener().on_remove(&removed);

        model.insert("a", 1);
        model.insert("b", 2);
        assert_eq!(model.insert("a", 3), Some(1));
        assert_eq!(model.remove(&"b"), Some(2));
        assert_eq!(model.remove(&"zzz"), None);

        assert_eq!(model.snapshot(), vec![("a", 3)]);
        assert_eq!(*log.borrow(), vec!["+a=1", "+b=2", "-a=1", "+a=3", "-b=2"]);
    }

    #[test]
    fn clear_reports_every_entry() {
        let model: MapModel<u8, u8> = MapModel::new();
        model.insert(1, 10);
        model.insert(2, 20);
        let count = Rc::new(std::cell::Cell::new(0));
        let sink = Rc::clone(&count);
        let removed: ListenerHandler<u8, u8> = Rc::new(move |_: &u8, _: &u8| sink.set(sink.get() + 1));
        model.listener().on_remove(&removed);

        model.clear();
        assert!(model.is_empty());
        assert_eq!(count.get(), 2);
    }
}
