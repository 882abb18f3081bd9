use dashmap::DashMap;
use std::collections::HashMap;
use std::hash::Hash;

/// Thread-safe map used as one level of the price store.
///
/// Values are handed out by clone, so nested levels are stored as `Arc`s and
/// no shard lock is ever held across calls.
pub struct Collection<K, V>
where
    K: Eq + Hash,
{
    data: DashMap<K, V>,
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Collection {
            data: DashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the existing value or inserts the one built by `create`.
    /// Concurrent callers racing on the same key all observe the same value.
    pub fn get_or_create(&self, key: K, create: impl FnOnce() -> V) -> V {
        if let Some(val) = self.get(&key) {
            return val;
        }

        self.data.entry(key).or_insert_with(create).value().clone()
    }

    pub fn set(&self, key: K, val: V) {
        self.data.insert(key, val);
    }

    pub fn remove(&self, key: &K) {
        self.data.remove(key);
    }

    pub fn keys(&self) -> Vec<K> {
        self.data.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Point-in-time copy of the contents.
    pub fn snapshot(&self) -> HashMap<K, V> {
        self.data
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl<K, V> Default for Collection<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
