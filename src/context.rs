//! Service context bundling all port trait objects.

use std::path::Path;

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::id_gen::LiveIdGenerator;
use crate::adapters::live::storage::FileKeyValueStore;
use crate::adapters::memory::{ManualClock, MemoryKeyValueStore, SequentialIdGenerator};
use crate::ports::clock::Clock;
use crate::ports::id_gen::IdGenerator;
use crate::ports::storage::KeyValueStore;

/// Bundles all port trait objects into a single context.
///
/// The application entry point owns the context and lends it to the task
/// store, context switcher, and focus timer; there are no ambient globals.
pub struct ServiceContext {
    /// Clock for obtaining the current time.
    pub clock: Box<dyn Clock>,
    /// ID generator for task and member ids.
    pub id_gen: Box<dyn IdGenerator>,
    /// Key-value store holding every persisted record.
    pub kv: Box<dyn KeyValueStore>,
}

impl ServiceContext {
    /// Creates a live context persisting records as JSON files under `root`.
    #[must_use]
    pub fn live(root: &Path) -> Self {
        Self {
            clock: Box::new(LiveClock),
            id_gen: Box::new(LiveIdGenerator::new()),
            kv: Box::new(FileKeyValueStore::new(root)),
        }
    }

    /// Creates a fully in-memory context driven by `clock`.
    ///
    /// Keep a clone of the clock to move time forward from the outside.
    #[must_use]
    pub fn in_memory(clock: ManualClock) -> Self {
        Self::with_store(clock, MemoryKeyValueStore::new())
    }

    /// Creates an in-memory context over a pre-populated store.
    #[must_use]
    pub fn with_store(clock: ManualClock, kv: MemoryKeyValueStore) -> Self {
        Self {
            clock: Box::new(clock),
            id_gen: Box::new(SequentialIdGenerator::default()),
            kv: Box::new(kv),
        }
    }
}
