//! Local Durable Cache
//!
//! Best-effort copy of created tasks kept in a single named slot of some
//! key-value storage (`localStorage` in the browser). Read once at startup;
//! never authoritative.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{SyncError, SyncResult};
use crate::task::Task;

/// Slot name holding the serialized task list
pub const CACHE_SLOT: &str = "tasks";

pub trait LocalCache {
    /// Add a record to the end of the persisted list
    fn append(&self, task: &Task) -> SyncResult<()>;

    /// Everything persisted so far, in insertion order
    fn load_all(&self) -> SyncResult<Vec<Task>>;
}

/// Named string slots, e.g. browser `localStorage`
pub trait SlotStorage {
    fn read(&self, slot: &str) -> SyncResult<Option<String>>;
    fn write(&self, slot: &str, value: &str) -> SyncResult<()>;
}

/// Stores the task list as a JSON array in one slot
pub struct JsonSlotCache<S> {
    storage: S,
    slot: String,
}

impl<S: SlotStorage> JsonSlotCache<S> {
    pub fn new(storage: S) -> Self {
        Self::with_slot(storage, CACHE_SLOT)
    }

    pub fn with_slot(storage: S, slot: impl Into<String>) -> Self {
        Self {
            storage,
            slot: slot.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read_list(&self) -> SyncResult<Vec<Task>> {
        match self.storage.read(&self.slot)? {
            Some(raw) if !raw.trim().is_empty() && raw.trim() != "null" => {
                serde_json::from_str(&raw).map_err(|e| {
                    SyncError::Cache(format!("slot '{}' is corrupt: {}", self.slot, e))
                })
            }
            _ => Ok(Vec::new()),
        }
    }
}

impl<S: SlotStorage> LocalCache for JsonSlotCache<S> {
    fn append(&self, task: &Task) -> SyncResult<()> {
        let mut tasks = self.read_list().unwrap_or_else(|e| {
            log::warn!("{}; starting a fresh list", e);
            Vec::new()
        });
        tasks.push(task.clone());
        let raw = serde_json::to_string(&tasks).map_err(|e| SyncError::Cache(e.to_string()))?;
        self.storage.write(&self.slot, &raw)
    }

    fn load_all(&self) -> SyncResult<Vec<Task>> {
        self.read_list()
    }
}

/// In-process slots for tests and non-browser builds
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: RefCell<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, slot: &str) -> Option<String> {
        self.slots.borrow().get(slot).cloned()
    }

    pub fn set_raw(&self, slot: &str, value: &str) {
        self.slots.borrow_mut().insert(slot.to_string(), value.to_string());
    }
}

impl SlotStorage for MemorySlots {
    fn read(&self, slot: &str) -> SyncResult<Option<String>> {
        Ok(self.raw(slot))
    }

    fn write(&self, slot: &str, value: &str) -> SyncResult<()> {
        self.set_raw(slot, value);
        Ok(())
    }
}
