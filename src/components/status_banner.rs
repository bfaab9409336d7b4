//! Status Banner Component
//!
//! Shows subscription failures and failed mutations above the board.

use leptos::prelude::*;

use crate::context::AppContext;
use crate::store::{use_app_store, BoardStateStoreFields};

#[component]
pub fn StatusBanner() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    view! {
        {move || store.fetch_error().get().map(|message| view! {
            <p class="error fetch-error">"Error: " {message}</p>
        })}
        {move || store.mutation_error().get().map(|message| view! {
            <p class="error mutation-error">
                {message}
                <button
                    type="button"
                    class="dismiss-btn"
                    on:click=move |_| ctx.dismiss_mutation_error()
                >
                    "×"
                </button>
            </p>
        })}
    }
}
