//! Task Form Component
//!
//! Form for creating new tasks.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_sync::{ServiceError, TaskDraft, ValidationErrors};
use web_sys::HtmlFormElement;

use crate::components::TaskFields;
use crate::context::AppContext;

#[component]
pub fn TaskForm() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let draft = RwSignal::new(TaskDraft::default());
    let errors = RwSignal::new(ValidationErrors::default());
    let reading_file = RwSignal::new(false);
    let (submitting, set_submitting) = signal(false);

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if reading_file.get_untracked() || submitting.get_untracked() {
            return;
        }
        let current = draft.get_untracked();
        if let Err(invalid) = current.validate() {
            errors.set(invalid);
            return;
        }
        errors.set(ValidationErrors::default());

        let form = event_target::<HtmlFormElement>(&ev);
        let service = ctx.service();
        set_submitting.set(true);
        spawn_local(async move {
            match service.create(&current).await {
                Ok(_) => {
                    draft.set(TaskDraft::default());
                    // Clears the file picker, which has no bound value
                    form.reset();
                }
                Err(ServiceError::Validation(invalid)) => errors.set(invalid),
                // Shown by the status banner
                Err(e) => log::debug!("create rejected: {}", e),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form class="task-form" on:submit=create_task>
            <h2>"Add New Task"</h2>
            <TaskFields draft=draft errors=errors reading_file=reading_file />
            <button
                type="submit"
                disabled=move || reading_file.get() || submitting.get()
            >
                {move || if submitting.get() { "Adding..." } else { "Add Task" }}
            </button>
        </form>
    }
}
