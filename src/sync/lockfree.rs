//! Containers guarded by [`RwLockable`](super::RwLockable)

use super::{ConcurrentMap, RwLockable};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Map where reads share a spin lock and writes take it exclusively
pub struct UnorderedMap<K, V> {
    map: RwLockable<HashMap<K, V>>,
}

impl<K, V> UnorderedMap<K, V> {
    pub fn new() -> Self {
        Self {
            map: RwLockable::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for UnorderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for UnorderedMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.read().iter()).finish()
    }
}

impl<K, V> ConcurrentMap<K, V> for UnorderedMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn contains(&self, key: &K) -> bool {
        self.map.read().contains_key(key)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.map.read().get(key).cloned()
    }

    fn snapshot(&self) -> HashMap<K, V> {
        self.map.read().clone()
    }

    fn insert(&self, key: K, value: V) -> bool {
        let mut map = self.map.write();
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, value);
        true
    }

    fn replace(&self, key: K, value: V) {
        self.map.write().insert(key, value);
    }

    fn erase(&self, key: &K) -> bool {
        self.map.write().remove(key).is_some()
    }

    fn clear(&self) {
        self.map.write().clear();
    }

    fn len(&self) -> usize {
        self.map.read().len()
    }
}
