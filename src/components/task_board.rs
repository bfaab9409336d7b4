//! Task Board Component
//!
//! Search and priority filters above the three lanes.

use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_sync::{Lanes, Priority, TaskFilter, TaskState};

use crate::components::Lane;
use crate::store::{use_app_store, BoardStateStoreFields};

/// Quiet time after the last keystroke before the search applies
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[component]
pub fn TaskBoard() -> impl IntoView {
    let store = use_app_store();

    // Raw input vs. the text the filter actually uses
    let (search_input, set_search_input) = signal(String::new());
    let (search, set_search) = signal(String::new());
    let (priority, set_priority) = signal::<Option<Priority>>(None);

    let on_search = move |ev: web_sys::Event| {
        let value = event_target_value(&ev);
        set_search_input.set(value.clone());
        spawn_local(async move {
            gloo_timers::future::sleep(SEARCH_DEBOUNCE).await;
            // A later keystroke supersedes this one
            if search_input.get_untracked() == value {
                set_search.set(value);
            }
        });
    };

    let lanes = Memo::new(move |_| {
        let filter = TaskFilter::new(search.get(), priority.get());
        store.tasks().with(|tasks| Lanes::partition(tasks, &filter))
    });

    view! {
        <div class="task-board">
            <div class="board-filters">
                <input
                    type="search"
                    placeholder="Search tasks..."
                    prop:value=move || search_input.get()
                    on:input=on_search
                />
                <select on:change=move |ev| {
                    set_priority.set(Priority::parse(&event_target_value(&ev)))
                }>
                    <option value="">"All Priorities"</option>
                    {Priority::ALL
                        .iter()
                        .map(|p| view! { <option value=p.as_str()>{p.as_str()}</option> })
                        .collect_view()}
                </select>
            </div>

            <Show when=move || store.loading().get()>
                <p class="loading">"Loading..."</p>
            </Show>

            <div class="lanes">
                {TaskState::ALL
                    .into_iter()
                    .map(|state| {
                        let tasks = Signal::derive(move || lanes.with(|l| l.get(state).to_vec()));
                        view! { <Lane state=state tasks=tasks /> }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
