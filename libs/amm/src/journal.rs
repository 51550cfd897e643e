//! Undo-logged map used to make pair operations all-or-nothing

use std::collections::HashMap;
use std::hash::Hash;

/// A `HashMap` that can record writes and roll them back.
///
/// While recording, the first write to every key saves its previous value;
/// `rollback` restores those values and `commit` discards them.
#[derive(Debug, Clone)]
pub struct Journaled<K, V> {
    map: HashMap<K, V>,
    undo: Option<HashMap<K, Option<V>>>,
}

impl<K, V> Default for Journaled<K, V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            undo: None,
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Journaled<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.map.iter()
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.record(&key);
        self.map.insert(key, value);
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.record(key);
        self.map.remove(key)
    }

    /// Start recording. Any previous uncommitted log is discarded.
    pub fn begin(&mut self) {
        self.undo = Some(HashMap::new());
    }

    pub fn commit(&mut self) {
        self.undo = None;
    }

    /// Restore every key written since `begin`, returning the restored keys.
    pub fn rollback(&mut self) -> Vec<K> {
        let Some(undo) = self.undo.take() else {
            return Vec::new();
        };
        let mut keys = Vec::with_capacity(undo.len());
        for (key, previous) in undo {
            match previous {
                Some(value) => {
                    self.map.insert(key.clone(), value);
                }
                None => {
                    self.map.remove(&key);
                }
            }
            keys.push(key);
        }
        keys
    }

    fn record(&mut self, key: &K) {
        if let Some(undo) = self.undo.as_mut() {
            if !undo.contains_key(key) {
                undo.insert(key.clone(), self.map.get(key).cloned());
            }
        }
    }
}
