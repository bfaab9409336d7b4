//! Board State Store
//!
//! Reactive mirror of the sync core's task collection. The core owns the
//! state; this store is refreshed on every transition so components get
//! field-level reactivity.

use leptos::prelude::*;
use reactive_stores::Store;
use task_sync::{Task, TaskCollection};

#[derive(Clone, Debug, Default, Store)]
pub struct BoardState {
    /// Every known task, in collection order
    pub tasks: Vec<Task>,
    /// A snapshot request is outstanding
    pub loading: bool,
    /// Last subscription failure, cleared by the next snapshot
    pub fetch_error: Option<String>,
    /// Last failed create/update/delete, until dismissed
    pub mutation_error: Option<String>,
}

/// Type alias for the store
pub type AppStore = Store<BoardState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Copy a collection transition into the store, touching only what changed
pub fn store_sync(store: &AppStore, collection: &TaskCollection) {
    if store.tasks().with_untracked(|tasks| tasks.as_slice() != collection.tasks()) {
        *store.tasks().write() = collection.tasks().to_vec();
    }

    let loading = collection.is_loading();
    if store.loading().get_untracked() != loading {
        store.loading().set(loading);
    }

    let fetch_error = collection.error().map(|e| e.to_string());
    if store.fetch_error().get_untracked() != fetch_error {
        store.fetch_error().set(fetch_error);
    }

    let mutation_error = collection
        .mutation_error()
        .map(|failure| format!("Could not {} task: {}", failure.kind.as_str(), failure.error));
    if store.mutation_error().get_untracked() != mutation_error {
        store.mutation_error().set(mutation_error);
    }
}
