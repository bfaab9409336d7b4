//! Task Collection State
//!
//! The in-memory copy of the board's tasks plus loading/error status,
//! changed only through [`TaskAction`] transitions.
//!
//! Every insertion is an upsert by id, so the optimistic add after a create
//! and the snapshot that follows it can never leave two copies of a task.

use crate::error::SyncError;
use crate::task::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
}

/// Which mutation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailure {
    pub kind: MutationKind,
    pub error: SyncError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskAction {
    FetchStart,
    /// Authoritative snapshot, replaces the whole collection
    FetchSuccess(Vec<Task>),
    FetchFailure(SyncError),
    Add(Task),
    /// Optimistic replace before the remote write is acknowledged
    Replace(Task),
    UpdateSucceeded(Task),
    /// Optimistic removal before the remote delete is acknowledged
    Remove(TaskId),
    DeleteSucceeded(TaskId),
    MutationFailed(MutationKind, SyncError),
    /// Undo an optimistic update/delete; `index` is where the task used to sit
    Restore { task: Task, index: usize },
    DismissMutationError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    phase: LoadPhase,
    error: Option<SyncError>,
    mutation_error: Option<MutationFailure>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    /// Last fetch error, cleared by the next successful snapshot
    pub fn error(&self) -> Option<&SyncError> {
        self.error.as_ref()
    }

    pub fn mutation_error(&self) -> Option<&MutationFailure> {
        self.mutation_error.as_ref()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn apply(&mut self, action: TaskAction) {
        match action {
            TaskAction::FetchStart => {
                self.phase = LoadPhase::Loading;
            }
            TaskAction::FetchSuccess(tasks) => {
                self.phase = LoadPhase::Ready;
                self.error = None;
                self.tasks.clear();
                for task in tasks {
                    self.upsert(task);
                }
            }
            TaskAction::FetchFailure(err) => {
                self.phase = LoadPhase::Ready;
                self.error = Some(err);
            }
            TaskAction::Add(task) => {
                self.upsert(task);
            }
            TaskAction::Replace(task) | TaskAction::UpdateSucceeded(task) => {
                if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *existing = task;
                }
            }
            TaskAction::Remove(id) | TaskAction::DeleteSucceeded(id) => {
                self.tasks.retain(|task| task.id != id);
            }
            TaskAction::MutationFailed(kind, error) => {
                self.mutation_error = Some(MutationFailure { kind, error });
            }
            TaskAction::Restore { task, index } => match self.position(&task.id) {
                Some(pos) => self.tasks[pos] = task,
                None => {
                    let index = index.min(self.tasks.len());
                    self.tasks.insert(index, task);
                }
            },
            TaskAction::DismissMutationError => {
                self.mutation_error = None;
            }
        }
    }

    fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskState};

    fn make_task(id: &str, title: &str) -> Task {
        Task::new(TaskId::from(id), title, "desc", Priority::Medium, TaskState::Todo)
    }

    #[test]
    fn test_starts_idle() {
        let c = TaskCollection::new();
        assert_eq!(c.phase(), LoadPhase::Idle);
        assert!(c.is_empty());
        assert!(c.error().is_none());
    }

    #[test]
    fn test_fetch_success_replaces_everything() {
        let mut c = TaskCollection::new();
        c.apply(TaskAction::Add(make_task("1", "local only")));
        c.apply(TaskAction::FetchStart);
        assert!(c.is_loading());

        c.apply(TaskAction::FetchSuccess(vec![make_task("2", "a"), make_task("3", "b")]));
        assert_eq!(c.phase(), LoadPhase::Ready);
        let ids: Vec<_> = c.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
    }

    #[test]
    fn test_snapshot_after_optimistic_add_has_one_copy() {
        let mut c = TaskCollection::new();
        c.apply(TaskAction::Add(make_task("1", "new")));
        c.apply(TaskAction::FetchSuccess(vec![make_task("1", "new"), make_task("1", "new")]));
        assert_eq!(c.len(), 1);

        c.apply(TaskAction::Add(make_task("1", "again")));
        assert_eq!(c.len(), 1);
        assert_eq!(c.tasks()[0].title, "again");
    }

    #[test]
    fn test_fetch_failure_keeps_tasks() {
        let mut c = TaskCollection::new();
        c.apply(TaskAction::FetchSuccess(vec![make_task("1", "keep me")]));
        c.apply(TaskAction::FetchFailure(SyncError::Network("network down".into())));

        assert_eq!(c.len(), 1);
        assert_eq!(c.error().map(|e| e.to_string()).as_deref(), Some("network down"));
        assert_eq!(c.phase(), LoadPhase::Ready);

        c.apply(TaskAction::FetchSuccess(vec![make_task("1", "keep me")]));
        assert!(c.error().is_none());
    }

    #[test]
    fn test_update_and_delete_ignore_unknown_ids() {
        let mut c = TaskCollection::new();
        c.apply(TaskAction::Add(make_task("1", "one")));

        c.apply(TaskAction::UpdateSucceeded(make_task("9", "ghost")));
        c.apply(TaskAction::DeleteSucceeded(TaskId::from("9")));
        assert_eq!(c.len(), 1);
        assert_eq!(c.tasks()[0].title, "one");

        c.apply(TaskAction::UpdateSucceeded(make_task("1", "renamed")));
        assert_eq!(c.tasks()[0].title, "renamed");

        c.apply(TaskAction::DeleteSucceeded(TaskId::from("1")));
        c.apply(TaskAction::DeleteSucceeded(TaskId::from("1")));
        assert!(c.is_empty());
    }

    #[test]
    fn test_restore_reinserts_at_index() {
        let mut c = TaskCollection::new();
        for id in ["1", "2", "3"] {
            c.apply(TaskAction::Add(make_task(id, id)));
        }
        c.apply(TaskAction::DeleteSucceeded(TaskId::from("2")));
        c.apply(TaskAction::Restore { task: make_task("2", "2"), index: 1 });
        let ids: Vec<_> = c.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);

        c.apply(TaskAction::Restore { task: make_task("4", "4"), index: 99 });
        assert_eq!(c.tasks().last().map(|t| t.id.as_str()), Some("4"));
    }

    #[test]
    fn test_mutation_error_roundtrip() {
        let mut c = TaskCollection::new();
        c.apply(TaskAction::MutationFailed(MutationKind::Delete, SyncError::StreamClosed));
        assert_eq!(c.mutation_error().map(|f| f.kind), Some(MutationKind::Delete));
        c.apply(TaskAction::DismissMutationError);
        assert!(c.mutation_error().is_none());
    }
}
