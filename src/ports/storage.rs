//! Key-value store port backing the storage gateway.

/// Boxed error returned by key-value store adapters.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// A flat namespace of named string records.
///
/// Reads and writes are synchronous and whole-record: a `set` either replaces
/// the record entirely or fails without a partial write being observable.
/// There is no locking, so two writers race with last-write-wins semantics.
pub trait KeyValueStore: Send + Sync {
    /// Returns the record stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the record under `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
