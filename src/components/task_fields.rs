//! Task Fields Component
//!
//! The inputs shared by the create and edit forms, bound to a draft.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_sync::{resolve_image, Field, Priority, TaskDraft, TaskState, ValidationErrors};
use web_sys::HtmlInputElement;

use crate::adapters::read_image_file;

/// Title, description, priority, state and image inputs.
///
/// `reading_file` is true while a picked image is still being read; forms
/// must not submit until it clears. `current_image` is previewed when the
/// draft supplies no image of its own.
#[component]
pub fn TaskFields(
    draft: RwSignal<TaskDraft>,
    #[prop(into)] errors: Signal<ValidationErrors>,
    reading_file: RwSignal<bool>,
    #[prop(default = None)] current_image: Option<String>,
) -> impl IntoView {
    let reads = StoredValue::new(FileReads::default());

    let on_file = move |ev: web_sys::Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        let ticket = reads.try_update_value(FileReads::start).unwrap_or_default();
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            draft.update(|d| d.image_file = None);
            reading_file.set(false);
            return;
        };
        reading_file.set(true);
        spawn_local(async move {
            let result = read_image_file(file).await;
            if !reads.with_value(|r| r.is_current(ticket)) {
                return;
            }
            match result {
                Ok(image) => draft.update(|d| d.image_file = Some(image)),
                Err(e) => log::warn!("could not read image: {}", e),
            }
            reading_file.set(false);
        });
    };

    let preview = move || {
        draft
            .with(|d| resolve_image(&d.image_url, d.image_file.as_ref()))
            .or_else(|| current_image.clone())
    };

    view! {
        <div class="task-fields">
            <label>
                "Title"
                <input
                    type="text"
                    prop:value=move || draft.with(|d| d.title.clone())
                    on:input=move |ev| draft.update(|d| d.title = event_target_value(&ev))
                />
            </label>
            {field_error(errors, Field::Title)}

            <label>
                "Description"
                <textarea
                    prop:value=move || draft.with(|d| d.description.clone())
                    on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                />
            </label>
            {field_error(errors, Field::Description)}

            <label>
                "Priority"
                <select
                    prop:value=move || draft.with(|d| d.priority.clone())
                    on:change=move |ev| draft.update(|d| d.priority = event_target_value(&ev))
                >
                    <option value="">"Select Priority"</option>
                    {Priority::ALL
                        .iter()
                        .map(|priority| view! {
                            <option value=priority.as_str()>{priority.as_str()}</option>
                        })
                        .collect_view()}
                </select>
            </label>
            {field_error(errors, Field::Priority)}

            <label>
                "State"
                <select
                    prop:value=move || draft.with(|d| d.state.clone())
                    on:change=move |ev| draft.update(|d| d.state = event_target_value(&ev))
                >
                    <option value="">"Select State"</option>
                    {TaskState::ALL
                        .iter()
                        .map(|state| view! {
                            <option value=state.as_str()>{state.label()}</option>
                        })
                        .collect_view()}
                </select>
            </label>
            {field_error(errors, Field::State)}

            <label>
                "Image URL"
                <input
                    type="url"
                    placeholder="https://..."
                    prop:value=move || draft.with(|d| d.image_url.clone())
                    on:input=move |ev| draft.update(|d| d.image_url = event_target_value(&ev))
                />
            </label>
            <label>
                "Or upload an image"
                <input type="file" accept="image/*" on:change=on_file />
            </label>
            <Show when=move || reading_file.get()>
                <span class="field-hint">"Reading image..."</span>
            </Show>

            {move || preview().map(|src| view! {
                <img class="image-preview" src=src alt="Preview" />
            })}
        </div>
    }
}

/// Numbers each file pick so only the latest read may land in the draft
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FileReads {
    latest: u64,
}

impl FileReads {
    fn start(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.latest == ticket
    }
}

fn field_error(errors: Signal<ValidationErrors>, field: Field) -> impl IntoView {
    move || {
        errors
            .with(|e| e.get(field))
            .map(|message| view! { <span class="field-error">{message}</span> })
    }
}
