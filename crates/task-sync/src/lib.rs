//! Task Sync Core
//!
//! Platform-independent half of the kanban board:
//! - task: the record and its enums
//! - collection / store: the state machine and its observable container
//! - gateway: remote store abstraction, in-memory store, stream folding
//! - cache: best-effort local copy of created tasks
//! - form / board: draft validation and the lane projection
//! - service: the effects tying all of the above together

mod backoff;
mod board;
mod cache;
mod collection;
mod error;
mod form;
mod service;
mod store;
mod task;

pub mod gateway;

pub use backoff::Backoff;
pub use board::{Lanes, TaskFilter};
pub use cache::{JsonSlotCache, LocalCache, MemorySlots, SlotStorage, CACHE_SLOT};
pub use collection::{LoadPhase, MutationFailure, MutationKind, TaskAction, TaskCollection};
pub use error::{ErrorKind, SyncError, SyncResult};
pub use form::{resolve_image, Field, ImageFile, TaskDraft, ValidDraft, ValidationErrors};
pub use gateway::{MemoryStore, RemoteStore, TASKS_COLLECTION};
pub use service::{Clock, ServiceError, TaskService};
pub use store::{ObserverId, TaskStore};
pub use task::{Priority, Task, TaskId, TaskState};
