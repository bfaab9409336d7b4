//! Remote Store Gateway
//!
//! Abstraction over the hosted realtime store, an in-memory implementation
//! and the helpers that turn streamed events into full snapshots.

mod traits;
mod memory;
mod snapshot;

pub use traits::{RemoteStore, SnapshotStream, TASKS_COLLECTION};
pub use memory::MemoryStore;
pub use snapshot::{normalize_collection, SnapshotTree, StreamEvent, StreamEventKind};
