//! String keyed container for keys that come from servers and scripts.
//!
//! Cookie domains, paths and names are attacker controlled. `SafeMap` makes its
//! behavior a pure function of the keys inserted through its own API: there is
//! no fallback lookup, no inherited member and no key that the container treats
//! as special. `"__proto__"` is just another key.

use std::collections::hash_map::{self, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeMap<V> {
    inner: HashMap<String, V>,
}

impl<V> SafeMap<V> {
    /// An empty container.
    pub fn new() -> Self {
        SafeMap {
            inner: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    /// Insert a value, returning the one previously under `key`.
    pub fn set(&mut self, key: &str, value: V) -> Option<V> {
        self.inner.insert(key.to_owned(), value)
    }

    /// Get the value under `key`, inserting one made by `f` if absent.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: &str, f: F) -> &mut V {
        self.inner.entry(key.to_owned()).or_insert_with(f)
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> Option<V> {
        self.inner.remove(key)
    }

    /// Inserted keys only. The iterator is `Clone`, so a walk can be restarted
    /// from a saved copy as well as by calling `keys()` again.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys(self.inner.keys())
    }

    pub fn values(&self) -> hash_map::Values<'_, String, V> {
        self.inner.values()
    }

    /// Drop every entry, keeping each value for which `f` returns true.
    pub fn retain<F: FnMut(&str, &mut V) -> bool>(&mut self, mut f: F) {
        self.inner.retain(|k, v| f(k, v))
    }

    /// Back to the state of `SafeMap::new()`.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<V> Default for SafeMap<V> {
    fn default() -> Self {
        SafeMap::new()
    }
}

/// Iterator over the keys of a [`SafeMap`].
#[derive(Debug)]
pub struct Keys<'a, V>(hash_map::Keys<'a, String, V>);

impl<'a, V> Clone for Keys<'a, V> {
    fn clone(&self) -> Self {
        Keys(self.0.clone())
    }
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|k| k.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, V> ExactSizeIterator for Keys<'a, V> {}
