//! Lane Component
//!
//! One board column holding the tasks of a single state.

use leptos::prelude::*;
use task_sync::{Task, TaskState};

use crate::components::TaskCard;

#[component]
pub fn Lane(state: TaskState, #[prop(into)] tasks: Signal<Vec<Task>>) -> impl IntoView {
    view! {
        <section class=format!("lane lane-{}", state.as_str())>
            <h2 class="lane-title">
                {state.label()}
                <span class="lane-count">{move || tasks.with(Vec::len)}</span>
            </h2>
            <Show
                when=move || tasks.with(|t| !t.is_empty())
                fallback=|| view! { <p class="lane-empty">"No tasks available"</p> }
            >
                <For
                    each=move || tasks.get()
                    // Whole record as key so edited cards re-render
                    key=|task| task.clone()
                    children=|task| view! { <TaskCard task=task /> }
                />
            </Show>
        </section>
    }
}
