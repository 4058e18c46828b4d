use std::cell::{Cell, RefCell};
use std::fmt;

use crate::cell::Destroy;
use crate::listener::Listener;

/// Stable identity of one array element, independent of its index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Key carried by array events.
///
/// `before` is the element now occupying the slot right after the affected
/// range, or `None` when the range ends the array. Views use it to place new
/// children under middle insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArrayKey {
    pub id: ItemId,
    pub before: Option<ItemId>,
}

#[derive(Clone)]
struct Entry<T> {
    id: ItemId,
    value: T,
}

/// Ordered collection emitting keyed add/remove events.
pub struct ArrayModel<T> {
    entries: RefCell<Vec<Entry<T>>>,
    next_id: Cell<u64>,
    listener: Listener<ArrayKey, T>,
}

impl<T: Clone + 'static> ArrayModel<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            listener: Listener::new(),
        }
    }

    pub fn from_vec(values: Vec<T>) -> Self {
        let model = Self::new();
        let entries = values
            .into_iter()
            .map(|value| Entry {
                id: model.allocate(),
                value,
            })
            .collect();
        *model.entries.borrow_mut() = entries;
        model
    }

    pub fn listener(&self) -> &Listener<ArrayKey, T> {
        &self.listener
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.entries.borrow().get(index).map(|entry| entry.value.clone())
    }

    pub fn id_at(&self, index: usize) -> Option<ItemId> {
        self.entries.borrow().get(index).map(|entry| entry.id)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.entries.borrow().iter().position(|entry| entry.id == id)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Current `(key, value)` pairs in order, each keyed as if appended.
    pub fn snapshot(&self) -> Vec<(ArrayKey, T)> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| {
                (
                    ArrayKey {
                        id: entry.id,
                        before: None,
                    },
                    entry.value.clone(),
                )
            })
            .collect()
    }

    /// Remove `delete_count` elements at `start` and insert `items` there.
    ///
    /// Out-of-range bounds are clamped. Returns the removed values.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: impl IntoIterator<Item = T>,
    ) -> Vec<T> {
        let added: Vec<Entry<T>> = items
            .into_iter()
            .map(|value| Entry {
                id: self.allocate(),
                value,
            })
            .collect();
        let (removed, before) = {
            let mut entries = self.entries.borrow_mut();
            let start = start.min(entries.len());
            let end = start.saturating_add(delete_count).min(entries.len());
            let removed: Vec<Entry<T>> =
                entries.splice(start..end, added.iter().cloned()).collect();
            let before = entries.get(start + added.len()).map(|entry| entry.id);
            (removed, before)
        };
        for entry in &removed {
            self.listener.emit_removed(
                &ArrayKey {
                    id: entry.id,
                    before,
                },
                &entry.value,
            );
        }
        for entry in &added {
            self.listener.emit_added(
                &ArrayKey {
                    id: entry.id,
                    before,
                },
                &entry.value,
            );
        }
        removed.into_iter().map(|entry| entry.value).collect()
    }

    pub fn push(&self, value: T) {
        let end = self.len();
        self.splice(end, 0, [value]);
    }

    pub fn pop(&self) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.splice(len - 1, 1, []).pop()
    }

    pub fn shift(&self) -> Option<T> {
        self.splice(0, 1, []).pop()
    }

    pub fn unshift(&self, value: T) {
        self.splice(0, 0, [value]);
    }

    pub fn insert(&self, index: usize, value: T) {
        self.splice(index, 0, [value]);
    }

    pub fn remove(&self, index: usize) -> Option<T> {
        self.splice(index, 1, []).pop()
    }

    /// Replace the element at `index`; emits remove(old) then add(new).
    ///
    /// Returns `None` without emitting anything when `index` is out of range.
    pub fn set(&self, index: usize, value: T) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        self.splice(index, 1, [value]).pop()
    }

    pub fn clear(&self) {
        let len = self.len();
        self.splice(0, len, []);
    }

    pub fn reverse(&self) {
        self.reorder(|entries| entries.reverse());
    }

    pub fn sort_by(&self, mut compare: impl FnMut(&T, &T) -> std::cmp::Ordering) {
        self.reorder(|entries| entries.sort_by(|a, b| compare(&a.value, &b.value)));
    }

    fn reorder(&self, apply: impl FnOnce(&mut Vec<Entry<T>>)) {
        let snapshot = {
            let mut entries = self.entries.borrow_mut();
            apply(&mut entries);
            entries.clone()
        };
        for entry in &snapshot {
            self.listener.emit_removed(
                &ArrayKey {
                    id: entry.id,
                    before: None,
                },
                &entry.value,
            );
        }
        for entry in &snapshot {
            self.listener.emit_added(
                &ArrayKey {
                    id: entry.id,
                    before: None,
                },
                &entry.value,
            );
        }
    }

    fn allocate(&self) -> ItemId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ItemId(id)
    }
}

impl<T: Clone + 'static> Default for ArrayModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Destroy for ArrayModel<T> {
    fn destroy(&self) {
        self.listener.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for ArrayModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.borrow().iter().map(|entry| &entry.value))
            .finish()
    }
}
