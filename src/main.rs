//! Kanban Board Frontend Entry Point

mod adapters;
mod app;
mod components;
mod config;
mod context;
mod store;

use app::App;
use config::AppConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::from_build_env();
    if let Err(e) = console_logger::init_logger("kanban", config.log_level) {
        web_sys::console::warn_1(&format!("[APP] logger already installed: {}", e).into());
    }
    mount_to_body(App);
}
