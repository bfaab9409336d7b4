//! Gateway Layer - Core Traits
//!
//! The store is keyed by task id under a collection root. The gateway keeps
//! no cache and applies no policy; retries, rollback and merging live in
//! the sync service.

use async_trait::async_trait;
use futures::stream::LocalBoxStream;

use crate::error::SyncResult;
use crate::task::{Task, TaskId};

/// Collection root holding every task record
pub const TASKS_COLLECTION: &str = "tasks";

/// Infinite stream of full-collection snapshots.
///
/// Ends (or yields an error) when the underlying listener dies; call
/// [`RemoteStore::subscribe`] again to restart.
pub type SnapshotStream = LocalBoxStream<'static, SyncResult<Vec<Task>>>;

#[async_trait(?Send)]
pub trait RemoteStore {
    /// Push-based listener; the first item is the current contents.
    fn subscribe(&self, collection: &str) -> SnapshotStream;

    /// Upsert the record at `collection/<id>`
    async fn write(&self, collection: &str, id: &TaskId, task: &Task) -> SyncResult<()>;

    /// Remove `collection/<id>`; removing an absent id succeeds
    async fn delete(&self, collection: &str, id: &TaskId) -> SyncResult<()>;
}

#[async_trait(?Send)]
impl<T: RemoteStore + ?Sized> RemoteStore for Box<T> {
    fn subscribe(&self, collection: &str) -> SnapshotStream {
        (**self).subscribe(collection)
    }

    async fn write(&self, collection: &str, id: &TaskId, task: &Task) -> SyncResult<()> {
        (**self).write(collection, id, task).await
    }

    async fn delete(&self, collection: &str, id: &TaskId) -> SyncResult<()> {
        (**self).delete(collection, id).await
    }
}
