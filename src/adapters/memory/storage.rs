//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::storage::{KeyValueStore, StoreError};

/// Key-value store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    #[must_use]
    pub fn with_records<I, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let records = records.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { records: Mutex::new(records) }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.records.lock().map_err(|_| "memory store lock poisoned".into())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_records() {
        let store = MemoryKeyValueStore::new();
        store.set("tasks", "[]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));
        store.remove("tasks").unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn seeds_from_records() {
        let store = MemoryKeyValueStore::with_records([("currentMemberId", "m-1")]);
        assert_eq!(store.get("currentMemberId").unwrap().as_deref(), Some("m-1"));
    }
}
