//! Edit Task Form Component
//!
//! In-place editor for one card. Saving keeps the task id; an empty image
//! keeps the current picture.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_sync::{ServiceError, Task, TaskDraft, ValidationErrors};

use crate::components::TaskFields;
use crate::context::AppContext;

#[component]
pub fn EditTaskForm(task: Task) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let draft = RwSignal::new(TaskDraft::from_task(&task));
    let errors = RwSignal::new(ValidationErrors::default());
    let reading_file = RwSignal::new(false);
    let (saving, set_saving) = signal(false);
    let id = task.id.clone();

    let save_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if reading_file.get_untracked() || saving.get_untracked() {
            return;
        }
        let current = draft.get_untracked();
        if let Err(invalid) = current.validate() {
            errors.set(invalid);
            return;
        }

        let service = ctx.service();
        let id = id.clone();
        set_saving.set(true);
        spawn_local(async move {
            match service.update(&id, &current).await {
                Err(ServiceError::Validation(invalid)) => errors.set(invalid),
                // Rolled back and reported by the status banner
                Err(e) => {
                    log::debug!("update of {} rejected: {}", id, e);
                    ctx.stop_editing();
                }
                Ok(_) => ctx.stop_editing(),
            }
            set_saving.set(false);
        });
    };

    view! {
        <form class="edit-task-form" on:submit=save_task>
            <TaskFields
                draft=draft
                errors=errors
                reading_file=reading_file
                current_image=task.image.clone()
            />
            <div class="edit-actions">
                <button
                    type="submit"
                    disabled=move || reading_file.get() || saving.get()
                >
                    "Save"
                </button>
                <button type="button" on:click=move |_| ctx.stop_editing()>
                    "Cancel"
                </button>
            </div>
        </form>
    }
}
