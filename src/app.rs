//! Kanban Board App
//!
//! Wires the sync service to the browser, mirrors its state into the
//! reactive store and lays out the form above the board.

use std::rc::Rc;

use futures::future::{AbortHandle, Abortable};
use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use task_sync::{JsonSlotCache, MemoryStore, RemoteStore, TaskService, TaskStore};

use crate::adapters::{BrowserSlots, RealtimeDbStore};
use crate::components::{LogPanel, StatusBanner, TaskBoard, TaskForm};
use crate::config::AppConfig;
use crate::context::{AppContext, BoardService};
use crate::store::{store_sync, BoardState};

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::from_build_env();

    let app_store = Store::new(BoardState::default());
    provide_context(app_store);

    let service = build_service(&config);
    service
        .store()
        .subscribe(move |collection| store_sync(&app_store, collection));
    service.bootstrap();

    // Snapshot listener lives as long as the app
    let (abort, registration) = AbortHandle::new_pair();
    let listener = service.clone();
    let backoff = config.backoff.clone();
    spawn_local(async move {
        let run = listener.run_subscription(backoff, gloo_timers::future::sleep);
        match Abortable::new(run, registration).await {
            Ok(err) => log::error!("task subscription stopped: {}", err),
            Err(_) => log::debug!("task subscription cancelled"),
        }
    });
    on_cleanup(move || abort.abort());

    provide_context(AppContext::new(service));

    view! {
        <div class="app-layout">
            <main class="main-content">
                <h1>"Kanban Board"</h1>
                {config.is_demo().then(|| view! {
                    <p class="demo-note">"Demo mode: tasks are kept in this tab only."</p>
                })}
                <StatusBanner />
                <TaskForm />
                <TaskBoard />
                <LogPanel />
            </main>
        </div>
    }
}

fn build_service(config: &AppConfig) -> BoardService {
    let remote: Box<dyn RemoteStore> = match &config.remote {
        Some(remote) => {
            log::info!("using realtime database at {}", remote.database_url);
            Box::new(RealtimeDbStore::new(remote.clone()))
        }
        None => {
            log::warn!("KANBAN_DATABASE_URL not set, running against an in-memory store");
            Box::new(MemoryStore::new())
        }
    };
    let cache = JsonSlotCache::new(BrowserSlots::new());
    TaskService::new(
        remote,
        cache,
        TaskStore::new(),
        Rc::new(|| js_sys::Date::now() as u64),
    )
}
