//! Log Panel Component
//!
//! Collapsible list of the latest log lines, for diagnosing sync trouble
//! without opening devtools.

use leptos::prelude::*;

#[component]
pub fn LogPanel() -> impl IntoView {
    let (open, set_open) = signal(false);
    let (lines, set_lines) = signal(Vec::<String>::new());

    let refresh = move || set_lines.set(console_logger::recent());

    view! {
        <section class="log-panel">
            <button
                type="button"
                class="log-toggle"
                on:click=move |_| {
                    if !open.get_untracked() {
                        refresh();
                    }
                    set_open.update(|o| *o = !*o);
                }
            >
                {move || if open.get() { "Hide log" } else { "Show log" }}
            </button>
            <Show when=move || open.get()>
                <button type="button" class="log-refresh" on:click=move |_| refresh()>
                    "Refresh"
                </button>
                <pre class="log-lines">
                    {move || lines.with(|lines| lines.join("\n"))}
                </pre>
            </Show>
        </section>
    }
}
