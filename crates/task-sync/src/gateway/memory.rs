//! In-Memory Remote Store
//!
//! Behaves like the hosted store for one process: every subscriber gets the
//! current snapshot right away and again after each write or delete.
//! Failures can be queued up front to exercise error paths.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};

use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::stream::{self, StreamExt};

use super::traits::{RemoteStore, SnapshotStream};
use crate::error::{SyncError, SyncResult};
use crate::task::{Task, TaskId};

type Subscriber = UnboundedSender<SyncResult<Vec<Task>>>;

#[derive(Default)]
pub struct MemoryStore {
    collections: RefCell<HashMap<String, BTreeMap<TaskId, Task>>>,
    subscribers: RefCell<Vec<(String, Subscriber)>>,
    write_failures: RefCell<VecDeque<SyncError>>,
    delete_failures: RefCell<VecDeque<SyncError>>,
    subscribe_failures: RefCell<VecDeque<SyncError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `tasks` under `collection`
    pub fn with_tasks(collection: &str, tasks: impl IntoIterator<Item = Task>) -> Self {
        let store = Self::new();
        {
            let mut collections = store.collections.borrow_mut();
            let records = collections.entry(collection.to_string()).or_default();
            for task in tasks {
                records.insert(task.id.clone(), task);
            }
        }
        store
    }

    /// The next write fails with `err`
    pub fn fail_next_write(&self, err: SyncError) {
        self.write_failures.borrow_mut().push_back(err);
    }

    /// The next delete fails with `err`
    pub fn fail_next_delete(&self, err: SyncError) {
        self.delete_failures.borrow_mut().push_back(err);
    }

    /// The next subscribe yields `err` and ends
    pub fn fail_next_subscribe(&self, err: SyncError) {
        self.subscribe_failures.borrow_mut().push_back(err);
    }

    /// Send `err` to every open listener and drop them, like a lost connection
    pub fn interrupt(&self, err: SyncError) {
        for (_, tx) in self.subscribers.borrow_mut().drain(..) {
            let _ = tx.unbounded_send(Err(err.clone()));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }

    pub fn get(&self, collection: &str, id: &TaskId) -> Option<Task> {
        self.collections
            .borrow()
            .get(collection)
            .and_then(|records| records.get(id).cloned())
    }

    pub fn snapshot(&self, collection: &str) -> Vec<Task> {
        self.collections
            .borrow()
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    fn broadcast(&self, collection: &str) {
        let snapshot = self.snapshot(collection);
        self.subscribers.borrow_mut().retain(|(path, tx)| {
            if path != collection {
                return !tx.is_closed();
            }
            tx.unbounded_send(Ok(snapshot.clone())).is_ok()
        });
    }
}

#[async_trait(?Send)]
impl RemoteStore for MemoryStore {
    fn subscribe(&self, collection: &str) -> SnapshotStream {
        if let Some(err) = self.subscribe_failures.borrow_mut().pop_front() {
            return stream::once(async move { Err(err) }).boxed_local();
        }
        let (tx, rx) = unbounded();
        let _ = tx.unbounded_send(Ok(self.snapshot(collection)));
        self.subscribers.borrow_mut().push((collection.to_string(), tx));
        rx.boxed_local()
    }

    async fn write(&self, collection: &str, id: &TaskId, task: &Task) -> SyncResult<()> {
        if let Some(err) = self.write_failures.borrow_mut().pop_front() {
            return Err(err);
        }
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), task.clone());
        self.broadcast(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &TaskId) -> SyncResult<()> {
        if let Some(err) = self.delete_failures.borrow_mut().pop_front() {
            return Err(err);
        }
        if let Some(records) = self.collections.borrow_mut().get_mut(collection) {
            records.remove(id);
        }
        self.broadcast(collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::TASKS_COLLECTION;
    use crate::task::{Priority, TaskState};
    use futures::StreamExt;

    fn make_task(id: &str) -> Task {
        Task::new(TaskId::from(id), format!("Task {}", id), "d", Priority::High, TaskState::Doing)
    }

    #[tokio::test]
    async fn test_subscribe_emits_current_then_changes() {
        let store = MemoryStore::with_tasks(TASKS_COLLECTION, [make_task("1")]);
        let mut snapshots = store.subscribe(TASKS_COLLECTION);

        let first = snapshots.next().await.unwrap().unwrap();
        assert_eq!(first, vec![make_task("1")]);

        store.write(TASKS_COLLECTION, &TaskId::from("2"), &make_task("2")).await.unwrap();
        let second = snapshots.next().await.unwrap().unwrap();
        assert_eq!(second.len(), 2);

        store.delete(TASKS_COLLECTION, &TaskId::from("1")).await.unwrap();
        let third = snapshots.next().await.unwrap().unwrap();
        assert_eq!(third, vec![make_task("2")]);
    }

    #[tokio::test]
    async fn test_write_is_an_upsert() {
        let store = MemoryStore::new();
        let id = TaskId::from("1");
        let mut task = make_task("1");
        store.write(TASKS_COLLECTION, &id, &task).await.unwrap();
        task.title = "changed".into();
        store.write(TASKS_COLLECTION, &id, &task).await.unwrap();
        store.write(TASKS_COLLECTION, &id, &task).await.unwrap();

        assert_eq!(store.snapshot(TASKS_COLLECTION).len(), 1);
        assert_eq!(store.get(TASKS_COLLECTION, &id).unwrap().title, "changed");
    }

    #[tokio::test]
    async fn test_delete_twice_is_fine() {
        let store = MemoryStore::with_tasks(TASKS_COLLECTION, [make_task("1")]);
        let id = TaskId::from("1");
        store.delete(TASKS_COLLECTION, &id).await.unwrap();
        store.delete(TASKS_COLLECTION, &id).await.unwrap();
        assert!(store.snapshot(TASKS_COLLECTION).is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed_once() {
        let store = MemoryStore::new();
        let id = TaskId::from("1");
        store.fail_next_write(SyncError::Network("offline".into()));
        assert!(store.write(TASKS_COLLECTION, &id, &make_task("1")).await.is_err());
        assert!(store.write(TASKS_COLLECTION, &id, &make_task("1")).await.is_ok());

        store.fail_next_subscribe(SyncError::StreamClosed);
        let items: Vec<_> = store.subscribe(TASKS_COLLECTION).collect().await;
        assert_eq!(items, vec![Err(SyncError::StreamClosed)]);
    }

    #[tokio::test]
    async fn test_dropped_subscribers_are_pruned() {
        let store = MemoryStore::new();
        let stream = store.subscribe(TASKS_COLLECTION);
        assert_eq!(store.subscriber_count(), 1);
        drop(stream);
        store.write(TASKS_COLLECTION, &TaskId::from("1"), &make_task("1")).await.unwrap();
        assert_eq!(store.subscriber_count(), 0);
    }
}
