//! Snapshot Folding
//!
//! The realtime REST stream sends incremental `put`/`patch` events rather
//! than whole collections. [`SnapshotTree`] folds them into a local JSON
//! tree so every event can be turned back into a full snapshot.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{SyncError, SyncResult};
use crate::task::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEventKind {
    /// Replace the value at `path` (null deletes it)
    Put,
    /// Replace each child of `path` named in `data`
    Patch,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamEvent {
    #[serde(skip, default = "default_kind")]
    pub kind: StreamEventKind,
    pub path: String,
    #[serde(default)]
    pub data: Value,
}

fn default_kind() -> StreamEventKind {
    StreamEventKind::Put
}

impl StreamEvent {
    /// Parse the `data:` payload of a `put` or `patch` event
    pub fn parse(kind: StreamEventKind, payload: &str) -> SyncResult<Self> {
        let mut event: StreamEvent = serde_json::from_str(payload)?;
        event.kind = kind;
        Ok(event)
    }
}

/// Local mirror of one collection's JSON
#[derive(Debug, Clone, Default)]
pub struct SnapshotTree {
    root: Value,
}

impl SnapshotTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: StreamEvent) -> SyncResult<()> {
        let segments = split_path(&event.path);
        match event.kind {
            StreamEventKind::Put => put(&mut self.root, &segments, event.data),
            StreamEventKind::Patch => match event.data {
                Value::Object(children) => {
                    for (key, value) in children {
                        let mut child_path = segments.clone();
                        child_path.push(key);
                        put(&mut self.root, &child_path, value);
                    }
                }
                Value::Null => {}
                other => {
                    return Err(SyncError::Decode(format!(
                        "patch at {} carried a non-object: {}",
                        event.path, other
                    )))
                }
            },
        }
        Ok(())
    }

    pub fn tasks(&self) -> Vec<Task> {
        normalize_collection(&self.root)
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn put(node: &mut Value, path: &[String], data: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = data;
        return;
    };
    if !node.is_object() {
        if data.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(children) = node else {
        return;
    };
    if rest.is_empty() {
        if data.is_null() {
            children.remove(head);
        } else {
            children.insert(head.clone(), data);
        }
        return;
    }
    let child = children.entry(head.clone()).or_insert(Value::Null);
    put(child, rest, data);
    if child.is_null() || child.as_object().is_some_and(Map::is_empty) {
        children.remove(head);
    }
}

/// Turn a collection value (`{id: record}`, an array, or null) into tasks.
///
/// The key is the id; records that fail to parse are skipped.
pub fn normalize_collection(value: &Value) -> Vec<Task> {
    let entries: Vec<(String, &Value)> = match value {
        Value::Object(records) => records.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(records) => records
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            log::warn!("ignoring non-collection snapshot: {}", other);
            Vec::new()
        }
    };

    entries
        .into_iter()
        .filter_map(|(key, record)| {
            let mut record = record.clone();
            if let Value::Object(fields) = &mut record {
                fields.insert("id".to_string(), Value::String(key.clone()));
            }
            match serde_json::from_value::<Task>(record) {
                Ok(task) => Some(task),
                Err(e) => {
                    log::warn!("skipping malformed task {}: {}", TaskId::new(key), e);
                    None
                }
            }
        })
        .collect()
}
