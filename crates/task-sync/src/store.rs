//! Observable Task Store
//!
//! Owns the [`TaskCollection`] and tells registered observers about every
//! transition. Handles are cheap to clone and share one collection; all of
//! this is single-threaded.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::collection::{TaskAction, TaskCollection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

type Observer = Rc<dyn Fn(&TaskCollection)>;

#[derive(Clone, Default)]
pub struct TaskStore {
    collection: Rc<RefCell<TaskCollection>>,
    observers: Rc<RefCell<Vec<(ObserverId, Observer)>>>,
    next_observer: Rc<Cell<u64>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a transition, then notify observers with the new state.
    ///
    /// Observers receive a copy, so they may dispatch again.
    pub fn dispatch(&self, action: TaskAction) {
        log::debug!("dispatch {}", action_name(&action));
        let current = {
            let mut collection = self.collection.borrow_mut();
            collection.apply(action);
            collection.clone()
        };
        let observers: Vec<Observer> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(&current);
        }
    }

    /// Register an observer; it is called immediately with the current state.
    pub fn subscribe(&self, observer: impl Fn(&TaskCollection) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);
        let observer: Observer = Rc::new(observer);
        self.observers.borrow_mut().push((id, observer.clone()));
        let current = self.collection.borrow().clone();
        observer(&current);
        id
    }

    pub fn unsubscribe(&self, id: ObserverId) {
        self.observers.borrow_mut().retain(|(oid, _)| *oid != id);
    }

    pub fn with<R>(&self, f: impl FnOnce(&TaskCollection) -> R) -> R {
        f(&self.collection.borrow())
    }

    pub fn snapshot(&self) -> TaskCollection {
        self.collection.borrow().clone()
    }
}

fn action_name(action: &TaskAction) -> &'static str {
    match action {
        TaskAction::FetchStart => "fetch_start",
        TaskAction::FetchSuccess(_) => "fetch_success",
        TaskAction::FetchFailure(_) => "fetch_failure",
        TaskAction::Add(_) => "add",
        TaskAction::Replace(_) => "replace",
        TaskAction::UpdateSucceeded(_) => "update_succeeded",
        TaskAction::Remove(_) => "remove",
        TaskAction::DeleteSucceeded(_) => "delete_succeeded",
        TaskAction::MutationFailed(..) => "mutation_failed",
        TaskAction::Restore { .. } => "restore",
        TaskAction::DismissMutationError => "dismiss_mutation_error",
    }
}
