//! Adapter implementations of the port traits.
//!
//! - `live` talks to the real system clock, UUIDs, and the filesystem.
//! - `memory` keeps everything in process, with a clock that only moves when
//!   told to.

pub mod live;
pub mod memory;
