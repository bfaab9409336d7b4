//! UI Components
//!
//! Reusable Leptos components.

mod delete_confirm_button;
mod edit_task_form;
mod lane;
mod log_panel;
mod status_banner;
mod task_board;
mod task_card;
mod task_fields;
mod task_form;

pub use delete_confirm_button::DeleteConfirmButton;
pub use edit_task_form::EditTaskForm;
pub use lane::Lane;
pub use log_panel::LogPanel;
pub use status_banner::StatusBanner;
pub use task_board::TaskBoard;
pub use task_card::TaskCard;
pub use task_fields::TaskFields;
pub use task_form::TaskForm;
