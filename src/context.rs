//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;
use task_sync::{JsonSlotCache, RemoteStore, TaskAction, TaskId, TaskService};

use crate::adapters::BrowserSlots;

/// The sync service as wired up in the browser
pub type BoardService = TaskService<Box<dyn RemoteStore>, JsonSlotCache<BrowserSlots>>;

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Single-threaded service, kept out of the reactive graph
    service: StoredValue<BoardService, LocalStorage>,
    /// Card currently in edit mode - read
    pub editing: ReadSignal<Option<TaskId>>,
    /// Card currently in edit mode - write
    set_editing: WriteSignal<Option<TaskId>>,
}

impl AppContext {
    pub fn new(service: BoardService) -> Self {
        let (editing, set_editing) = signal(None);
        Self {
            service: StoredValue::new_local(service),
            editing,
            set_editing,
        }
    }

    pub fn service(&self) -> BoardService {
        self.service.get_value()
    }

    /// Put one card in edit mode, closing any other
    pub fn start_editing(&self, id: TaskId) {
        self.set_editing.set(Some(id));
    }

    pub fn stop_editing(&self) {
        self.set_editing.set(None);
    }

    pub fn is_editing(&self, id: &TaskId) -> bool {
        self.editing.with(|editing| editing.as_ref() == Some(id))
    }

    pub fn dismiss_mutation_error(&self) {
        self.service().store().dispatch(TaskAction::DismissMutationError);
    }
}
