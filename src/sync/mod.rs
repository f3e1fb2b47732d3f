//! Synchronization primitives and thread-safe containers
//!
//! The two map flavors share the [`ConcurrentMap`] contract. Iteration is
//! always done on a [`ConcurrentMap::snapshot`], so no lock is held while
//! the caller works on the entries.

use std::collections::HashMap;
use std::hash::Hash;

mod rwlock;
pub use rwlock::*;
pub mod lockbased;
pub mod lockfree;

/// Key-value container safe to share between threads
pub trait ConcurrentMap<K, V>: Send + Sync
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn contains(&self, key: &K) -> bool;
    /// Copy of the value for `key`
    fn get(&self, key: &K) -> Option<V>;
    /// Copy of the whole map at one point in time
    fn snapshot(&self) -> HashMap<K, V>;
    /// Insert if absent. Returns `false` and leaves the map unchanged if `key` exists.
    fn insert(&self, key: K, value: V) -> bool;
    /// Insert or overwrite
    fn replace(&self, key: K, value: V);
    /// Remove `key`, returns `true` if it was present
    fn erase(&self, key: &K) -> bool;
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
