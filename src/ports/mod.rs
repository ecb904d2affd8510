//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the board core and something it
//! does not control (wall-clock time, id minting, the key-value store).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod id_gen;
pub mod storage;

pub use clock::Clock;
pub use id_gen::IdGenerator;
pub use storage::{KeyValueStore, StoreError};
