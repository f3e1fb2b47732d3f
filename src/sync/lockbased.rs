//! Containers guarded by a mutex

use super::ConcurrentMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;

/// Map where every operation is serialized by one mutex
#[derive(Debug, Default)]
pub struct UnorderedMap<K, V> {
    map: Mutex<HashMap<K, V>>,
}

impl<K, V> UnorderedMap<K, V> {
    pub fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> ConcurrentMap<K, V> for UnorderedMap<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn contains(&self, key: &K) -> bool {
        self.map.lock().contains_key(key)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.map.lock().get(key).cloned()
    }

    fn snapshot(&self) -> HashMap<K, V> {
        self.map.lock().clone()
    }

    fn insert(&self, key: K, value: V) -> bool {
        let mut map = self.map.lock();
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, value);
        true
    }

    fn replace(&self, key: K, value: V) {
        self.map.lock().insert(key, value);
    }

    fn erase(&self, key: &K) -> bool {
        self.map.lock().remove(key).is_some()
    }

    fn clear(&self) {
        self.map.lock().clear();
    }

    fn len(&self) -> usize {
        self.map.lock().len()
    }
}

/// A value copied in and out under a mutex.
///
/// Meant for small settings that are read far more often than written and
/// must never be observed half-updated.
#[derive(Debug, Default)]
pub struct Container<T> {
    value: Mutex<T>,
}

impl<T: Clone> Container<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    /// Copy of the current value
    pub fn get(&self) -> T {
        self.value.lock().clone()
    }

    pub fn set(&self, value: T) {
        *self.value.lock() = value;
    }

    /// Modify the value in place under the lock
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(&mut self.value.lock());
    }
}

#[cfg(test)]
mod ut {
    use super::*;

    #[test]
    fn test_container() {
        let c = Container::new(vec!["stdout".to_string()]);
        c.update(|v| v.push("stderr".to_string()));
        assert_eq!(vec!["stdout", "stderr"], c.get());
        c.set(vec![]);
        assert!(c.get().is_empty());
    }
}
