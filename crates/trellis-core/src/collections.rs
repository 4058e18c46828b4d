#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};

    pub type BuildHasher = std::collections::hash_map::RandomState;
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use hashbrown::{HashMap, HashSet};

    pub type BuildHasher = ahash::RandomState;
}

/// Insertion-ordered map used by the keyed collection models.
pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, map::BuildHasher>;

/// Insertion-ordered set used by the keyed collection models.
pub type OrderedSet<T> = indexmap::IndexSet<T, map::BuildHasher>;
