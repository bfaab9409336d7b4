//! Browser Adapters
//!
//! Browser-side implementations of the sync core's seams, organized by
//! the API they wrap.

mod file_reader;
mod local_storage;
mod realtime_db;

use wasm_bindgen::JsValue;

pub use file_reader::read_image_file;
pub use local_storage::BrowserSlots;
pub use realtime_db::RealtimeDbStore;

/// Best-effort text for a thrown JS value
pub(crate) fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
