//! Task Card Component
//!
//! One task on the board, or its editor while it is being edited.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_sync::Task;

use crate::components::{DeleteConfirmButton, EditTaskForm};
use crate::context::AppContext;

#[component]
pub fn TaskCard(task: Task) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let task = StoredValue::new(task);
    let id = task.with_value(|t| t.id.clone());

    let is_editing = {
        let id = id.clone();
        move || ctx.is_editing(&id)
    };

    let delete_task = {
        let id = id.clone();
        Callback::new(move |_: ()| {
            let service = ctx.service();
            let id = id.clone();
            if ctx.is_editing(&id) {
                ctx.stop_editing();
            }
            spawn_local(async move {
                // Failures are rolled back and reported by the status banner
                if let Err(e) = service.delete(&id).await {
                    log::debug!("delete of {} rejected: {}", id, e);
                }
            });
        })
    };

    view! {
        <Show
            when=is_editing
            fallback=move || {
                let current = task.get_value();
                let id = current.id.clone();
                view! {
                    <article class="task-card">
                        <h3 class="task-title">{current.title.clone()}</h3>
                        {current.image.clone().map(|src| view! {
                            <img class="task-image" src=src alt=current.title.clone() />
                        })}
                        <p class="task-description">{current.description.clone()}</p>
                        <p class="task-meta">
                            <span class="task-priority">
                                "Priority: " {current.priority.as_str()}
                            </span>
                            <span class="task-state">
                                "Status: " {current.state.label()}
                            </span>
                        </p>
                        <div class="task-actions">
                            <button
                                type="button"
                                class="edit-btn"
                                on:click=move |_| ctx.start_editing(id.clone())
                            >
                                "Edit"
                            </button>
                            <DeleteConfirmButton
                                task_title=current.title.clone()
                                on_confirm=delete_task
                            />
                        </div>
                    </article>
                }
            }
        >
            <EditTaskForm task=task.get_value() />
        </Show>
    }
}
