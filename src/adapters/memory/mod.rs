//! In-process adapters used by tests, simulations, and dry runs.

pub mod clock;
pub mod id_gen;
pub mod storage;

pub use clock::ManualClock;
pub use id_gen::SequentialIdGenerator;
pub use storage::MemoryKeyValueStore;
