//! Shared keyed tally
//!
//! A single `RwLock` guards the whole map: every mutation is one critical
//! section, and snapshots are taken under the read side so a reader never
//! observes a half-applied update.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::Entry;

/// Thread-safe mapping from key to [`Entry`]
///
/// Share it between the decode pipeline and any readers with an `Arc`.
#[derive(Debug, Default)]
pub struct CounterStore {
    items: RwLock<HashMap<String, Entry>>,
}

impl CounterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to `key`, creating the entry (named after its key) when absent.
    ///
    /// Returns the entry as it stands after the update.
    pub fn increment_or_create(&self, key: &str, delta: i64) -> Entry {
        let mut items = self.items.write();
        let entry = items
            .entry(key.to_string())
            .and_modify(|e| e.value += delta)
            .or_insert_with(|| Entry::new(key, delta));
        entry.clone()
    }

    /// Change the display name of `key`. Unknown keys are ignored.
    ///
    /// Returns `true` when an entry was renamed.
    pub fn rename(&self, key: &str, display_name: &str) -> bool {
        let mut items = self.items.write();
        match items.get_mut(key) {
            Some(entry) => {
                entry.display_name = display_name.to_string();
                true
            }
            None => false,
        }
    }

    /// Copy of a single entry
    pub fn get(&self, key: &str) -> Option<Entry> {
        self.items.read().get(key).cloned()
    }

    /// Consistent copy of every entry, ordered by key
    pub fn snapshot(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self.items.read().values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// True when no key has been seen yet
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}
