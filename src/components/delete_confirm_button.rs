//! Delete Confirm Button Component
//!
//! Two-step delete for a card: the first click arms it and names the task,
//! the second deletes. An armed button falls back to idle on its own.

use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;

/// How long the confirmation stays up without an answer
const ARMED_FOR: Duration = Duration::from_secs(4);

/// Prompt shown while armed
fn confirm_prompt(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        "Delete this task?".to_string()
    } else {
        format!("Delete \"{}\"?", title)
    }
}

#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] task_title: String,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    // Bumped on every arm so an old timeout cannot disarm a newer prompt
    let rounds = StoredValue::new(0u32);
    let (armed, set_armed) = signal::<Option<u32>>(None);
    let prompt = confirm_prompt(&task_title);

    let arm = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        rounds.update_value(|r| *r += 1);
        let round = rounds.get_value();
        set_armed.set(Some(round));
        spawn_local(async move {
            gloo_timers::future::sleep(ARMED_FOR).await;
            if armed.get_untracked() == Some(round) {
                set_armed.set(None);
            }
        });
    };

    view! {
        {move || match armed.get() {
            None => view! {
                <button type="button" class="delete-btn" on:click=arm>
                    "Delete"
                </button>
            }
            .into_any(),
            Some(_) => view! {
                <span class="delete-confirm">
                    <span class="delete-confirm-text">{prompt.clone()}</span>
                    <button
                        type="button"
                        class="confirm-btn"
                        on:click=move |ev| {
                            ev.stop_propagation();
                            set_armed.set(None);
                            on_confirm.run(());
                        }
                    >
                        "✓"
                    </button>
                    <button
                        type="button"
                        class="cancel-btn"
                        on:click=move |ev| {
                            ev.stop_propagation();
                            set_armed.set(None);
                        }
                    >
                        "✗"
                    </button>
                </span>
            }
            .into_any(),
        }}
    }
}
