//! localStorage Slots

use task_sync::{SlotStorage, SyncError, SyncResult};
use web_sys::Storage;

use super::js_error;

/// `window.localStorage`, when the browser allows it.
///
/// Private windows and sandboxed frames may refuse storage; reads then see
/// nothing and writes fail with a cache error.
pub struct BrowserSlots {
    storage: Option<Storage>,
}

impl BrowserSlots {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage is unavailable, created tasks will not be cached");
        }
        Self { storage }
    }
}

impl SlotStorage for BrowserSlots {
    fn read(&self, slot: &str) -> SyncResult<Option<String>> {
        match &self.storage {
            Some(storage) => storage
                .get_item(slot)
                .map_err(|e| SyncError::Cache(js_error(&e))),
            None => Ok(None),
        }
    }

    fn write(&self, slot: &str, value: &str) -> SyncResult<()> {
        match &self.storage {
            Some(storage) => storage
                .set_item(slot, value)
                .map_err(|e| SyncError::Cache(js_error(&e))),
            None => Err(SyncError::Cache("localStorage is unavailable".into())),
        }
    }
}
