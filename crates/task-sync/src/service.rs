//! Task Service
//!
//! Drives the effects around the store: cache bootstrap, create/update/
//! delete round trips to the remote store with rollback on failure, and the
//! long-running snapshot subscription with reconnect backoff.

use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;

use crate::backoff::Backoff;
use crate::cache::LocalCache;
use crate::collection::{MutationKind, TaskAction};
use crate::error::SyncError;
use crate::form::{TaskDraft, ValidationErrors};
use crate::gateway::{RemoteStore, TASKS_COLLECTION};
use crate::store::TaskStore;
use crate::task::{Task, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("Task {0} not found")]
    NotFound(TaskId),
}

/// Milliseconds since the epoch
pub type Clock = Rc<dyn Fn() -> u64>;

struct Inner<R, C> {
    remote: R,
    cache: C,
    store: TaskStore,
    clock: Clock,
    collection: String,
    /// Ids handed out to creates that have not been acknowledged yet
    reserved: RefCell<HashSet<TaskId>>,
}

pub struct TaskService<R, C> {
    inner: Rc<Inner<R, C>>,
}

impl<R, C> Clone for TaskService<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: RemoteStore, C: LocalCache> TaskService<R, C> {
    pub fn new(remote: R, cache: C, store: TaskStore, clock: Clock) -> Self {
        Self {
            inner: Rc::new(Inner {
                remote,
                cache,
                store,
                clock,
                collection: TASKS_COLLECTION.to_string(),
                reserved: RefCell::new(HashSet::new()),
            }),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.inner.store
    }

    pub fn remote(&self) -> &R {
        &self.inner.remote
    }

    pub fn cache(&self) -> &C {
        &self.inner.cache
    }

    /// Re-populate the collection from the local cache. Returns how many
    /// records were loaded; a broken cache is logged and skipped.
    pub fn bootstrap(&self) -> usize {
        match self.inner.cache.load_all() {
            Ok(tasks) => {
                let count = tasks.len();
                for task in tasks {
                    self.inner.store.dispatch(TaskAction::Add(task));
                }
                log::info!("hydrated {} task(s) from local cache", count);
                count
            }
            Err(e) => {
                log::warn!("local cache unavailable: {}", e);
                0
            }
        }
    }

    pub async fn create(&self, draft: &TaskDraft) -> Result<Task, ServiceError> {
        let valid = draft.validate()?;
        let id = self.reserve_id();
        let task = valid.into_task(id.clone());

        let result = self
            .inner
            .remote
            .write(&self.inner.collection, &task.id, &task)
            .await;
        self.inner.reserved.borrow_mut().remove(&id);

        if let Err(err) = result {
            log::error!("failed to create task {}: {}", task.id, err);
            self.inner
                .store
                .dispatch(TaskAction::MutationFailed(MutationKind::Create, err.clone()));
            return Err(err.into());
        }

        log::info!("task {} created", task.id);
        if let Err(e) = self.inner.cache.append(&task) {
            log::warn!("could not cache task {}: {}", task.id, e);
        }
        self.inner.store.dispatch(TaskAction::Add(task.clone()));
        Ok(task)
    }

    /// Replace the task `id` with the edited fields, keeping its id.
    pub async fn update(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, ServiceError> {
        let valid = draft.validate()?;
        let (original, index) = self
            .locate(id)
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
        let updated = valid.merge_into(&original);

        self.inner.store.dispatch(TaskAction::Replace(updated.clone()));
        match self
            .inner
            .remote
            .write(&self.inner.collection, &updated.id, &updated)
            .await
        {
            Ok(()) => {
                log::info!("task {} updated", updated.id);
                self.inner
                    .store
                    .dispatch(TaskAction::UpdateSucceeded(updated.clone()));
                Ok(updated)
            }
            Err(err) => {
                log::error!("failed to update task {}: {}", id, err);
                self.inner.store.dispatch(TaskAction::Restore {
                    task: original,
                    index,
                });
                self.inner
                    .store
                    .dispatch(TaskAction::MutationFailed(MutationKind::Update, err.clone()));
                Err(err.into())
            }
        }
    }

    pub async fn delete(&self, id: &TaskId) -> Result<(), ServiceError> {
        let previous = self.locate(id);
        if previous.is_some() {
            self.inner.store.dispatch(TaskAction::Remove(id.clone()));
        }

        match self.inner.remote.delete(&self.inner.collection, id).await {
            Ok(()) => {
                log::info!("task {} deleted", id);
                self.inner.store.dispatch(TaskAction::DeleteSucceeded(id.clone()));
                Ok(())
            }
            Err(err) => {
                log::error!("failed to delete task {}: {}", id, err);
                if let Some((task, index)) = previous {
                    self.inner.store.dispatch(TaskAction::Restore { task, index });
                }
                self.inner
                    .store
                    .dispatch(TaskAction::MutationFailed(MutationKind::Delete, err.clone()));
                Err(err.into())
            }
        }
    }

    /// Apply remote snapshots until a fatal error or the backoff gives up.
    ///
    /// Transient failures and ended streams are shown as fetch errors and
    /// retried after `sleep(delay)`. Returns the error that ended the loop.
    /// Dropping the future stops applying snapshots; writes already in
    /// flight are not affected.
    pub async fn run_subscription<S, F>(&self, mut backoff: Backoff, sleep: S) -> SyncError
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        self.inner.store.dispatch(TaskAction::FetchStart);
        loop {
            let mut snapshots = self.inner.remote.subscribe(&self.inner.collection);
            let mut failure = None;
            while let Some(next) = snapshots.next().await {
                match next {
                    Ok(tasks) => {
                        backoff.reset();
                        log::debug!("snapshot with {} task(s)", tasks.len());
                        self.inner.store.dispatch(TaskAction::FetchSuccess(tasks));
                    }
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
            drop(snapshots);

            let err = failure.unwrap_or(SyncError::StreamClosed);
            log::warn!("task subscription interrupted: {}", err);
            self.inner.store.dispatch(TaskAction::FetchFailure(err.clone()));
            if !err.is_transient() {
                return err;
            }

            match backoff.next_delay() {
                Some(delay) => {
                    log::info!("resubscribing in {:?}", delay);
                    sleep(delay).await;
                }
                None => {
                    let err = SyncError::RetriesExhausted(backoff.attempts());
                    log::error!("{}", err);
                    self.inner.store.dispatch(TaskAction::FetchFailure(err.clone()));
                    return err;
                }
            }
        }
    }

    fn locate(&self, id: &TaskId) -> Option<(Task, usize)> {
        self.inner
            .store
            .with(|c| c.position(id).map(|index| (c.tasks()[index].clone(), index)))
    }

    fn reserve_id(&self) -> TaskId {
        let now = (self.inner.clock)();
        let mut reserved = self.inner.reserved.borrow_mut();
        let id = self
            .inner
            .store
            .with(|c| TaskId::generate(now, |id| c.contains(id) || reserved.contains(id)));
        reserved.insert(id.clone());
        id
    }
}
