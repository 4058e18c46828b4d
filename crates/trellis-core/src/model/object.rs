use std::fmt;

use crate::cell::Destroy;
use crate::listener::Listener;
use crate::model::MapModel;

/// String-keyed record whose fields can be added and deleted at runtime.
pub struct ObjectModel<V> {
    fields: MapModel<String, V>,
}

impl<V: Clone + 'static> ObjectModel<V> {
    pub fn new() -> Self {
        Self {
            fields: MapModel::new(),
        }
    }

    pub fn listener(&self) -> &Listener<String, V> {
        self.fields.listener()
    }

    pub fn set(&self, key: impl Into<String>, value: V) -> Option<V> {
        self.fields.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.fields.get(&key.to_string())
    }

    pub fn delete(&self, key: &str) -> Option<V> {
        self.fields.remove(&key.to_string())
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(&key.to_string())
    }

    pub fn keys(&self) -> Vec<String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn snapshot(&self) -> Vec<(String, V)> {
        self.fields.snapshot()
    }
}

impl<V: Clone + 'static> Default for ObjectModel<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + 'static> Destroy for ObjectModel<V> {
    fn destroy(&self) {
        self.fields.destroy();
    }
}

impl<V: fmt::Debug> fmt::Debug for ObjectModel<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.fields, f)
    }
}
