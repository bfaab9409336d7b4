//! Realtime Database Gateway
//!
//! Talks to a hosted realtime JSON database over its REST surface:
//! `PUT`/`DELETE` on `<root>/tasks/<id>.json` for writes and a server-sent
//! event stream on `<root>/tasks.json` for snapshots.

use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::stream::{self, Stream, StreamExt};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use task_sync::gateway::{SnapshotStream, SnapshotTree, StreamEvent, StreamEventKind};
use task_sync::{RemoteStore, SyncError, SyncResult, Task, TaskId};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventSource, MessageEvent};

use super::js_error;
use crate::config::RemoteConfig;

/// Everything except unreserved characters is escaped inside a segment
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub struct RealtimeDbStore {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl RealtimeDbStore {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, segments: &[&str]) -> String {
        resource_url(&self.config.database_url, segments, self.config.auth.as_deref())
    }
}

#[async_trait(?Send)]
impl RemoteStore for RealtimeDbStore {
    fn subscribe(&self, collection: &str) -> SnapshotStream {
        let url = self.url(&[collection]);
        log::info!("listening on {}", collection);
        match EventStream::open(&url) {
            Ok(events) => events.boxed_local(),
            Err(e) => stream::once(async move { Err(e) }).boxed_local(),
        }
    }

    async fn write(&self, collection: &str, id: &TaskId, task: &Task) -> SyncResult<()> {
        let response = self
            .client
            .put(self.url(&[collection, id.as_str()]))
            .json(task)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        check_status(response).await
    }

    async fn delete(&self, collection: &str, id: &TaskId) -> SyncResult<()> {
        let response = self
            .client
            .delete(self.url(&[collection, id.as_str()]))
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        check_status(response).await
    }
}

async fn check_status(response: reqwest::Response) -> SyncResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(SyncError::from_status(status.as_u16(), error_message(&body)))
}

/// `<root>/<seg>/<seg>.json[?auth=<token>]`
fn resource_url(root: &str, segments: &[&str], auth: Option<&str>) -> String {
    let mut url = root.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(&utf8_percent_encode(segment, SEGMENT_ENCODE_SET).to_string());
    }
    url.push_str(".json");
    if let Some(token) = auth {
        url.push_str("?auth=");
        url.push_str(&utf8_percent_encode(token, SEGMENT_ENCODE_SET).to_string());
    }
    url
}

/// Error bodies look like `{"error": "Permission denied"}`
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(|error| error.as_str())
    {
        return message.to_string();
    }
    let body = body.trim();
    if body.is_empty() {
        "request failed".to_string()
    } else {
        body.to_string()
    }
}

// ========================
// Event Stream
// ========================

type Snapshot = SyncResult<Vec<Task>>;

/// One `EventSource` connection, yielding a full snapshot per event.
///
/// Ends after the first error; the source is closed on drop so the browser
/// does not reconnect on its own.
struct EventStream {
    source: EventSource,
    receiver: UnboundedReceiver<Snapshot>,
    _message_listeners: Vec<Closure<dyn FnMut(MessageEvent)>>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventStream {
    fn open(url: &str) -> SyncResult<Self> {
        let source = EventSource::new(url).map_err(|e| SyncError::Network(js_error(&e)))?;
        let (sender, receiver) = unbounded();
        let tree = Rc::new(RefCell::new(SnapshotTree::new()));

        let mut listeners = Vec::new();
        for (name, kind) in [("put", StreamEventKind::Put), ("patch", StreamEventKind::Patch)] {
            let sender = sender.clone();
            let tree = tree.clone();
            listeners.push(listen(&source, name, move |event| {
                let payload = event.data().as_string().unwrap_or_default();
                match fold_event(&tree, kind, &payload) {
                    Ok(tasks) => send(&sender, Ok(tasks)),
                    Err(e) => log::warn!("ignoring {} event: {}", name, e),
                }
            })?);
        }

        let cancel_sender = sender.clone();
        listeners.push(listen(&source, "cancel", move |event| {
            let reason = event_text(&event).unwrap_or_else(|| "listener cancelled".into());
            send(&cancel_sender, Err(SyncError::PermissionDenied(reason)));
        })?);

        let revoked_sender = sender.clone();
        listeners.push(listen(&source, "auth_revoked", move |_| {
            send(&revoked_sender, Err(SyncError::AuthRevoked));
        })?);

        let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            send(&sender, Err(SyncError::Network("realtime connection lost".into())));
        });
        source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Self {
            source,
            receiver,
            _message_listeners: listeners,
            _on_error: on_error,
        })
    }
}

impl Stream for EventStream {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Snapshot>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.source.set_onerror(None);
        self.source.close();
    }
}

fn listen(
    source: &EventSource,
    name: &str,
    handler: impl FnMut(MessageEvent) + 'static,
) -> SyncResult<Closure<dyn FnMut(MessageEvent)>> {
    let callback = Closure::<dyn FnMut(MessageEvent)>::new(handler);
    source
        .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
        .map_err(|e| SyncError::Network(js_error(&e)))?;
    Ok(callback)
}

fn send(sender: &UnboundedSender<Snapshot>, item: Snapshot) {
    // The receiver is gone once the stream has been dropped
    let _ = sender.unbounded_send(item);
}

fn fold_event(
    tree: &RefCell<SnapshotTree>,
    kind: StreamEventKind,
    payload: &str,
) -> SyncResult<Vec<Task>> {
    let event = StreamEvent::parse(kind, payload)?;
    let mut tree = tree.borrow_mut();
    tree.apply(event)?;
    Ok(tree.tasks())
}

fn event_text(event: &MessageEvent) -> Option<String> {
    event
        .data()
        .as_string()
        .map(|text| text.trim().trim_matches('"').to_string())
        .filter(|text| !text.is_empty() && text != "null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_url() {
        assert_eq!(
            resource_url("https://db.example.com/", &["tasks"], None),
            "https://db.example.com/tasks.json"
        );
        assert_eq!(
            resource_url("https://db.example.com", &["tasks", "1700000000000"], Some("a+b/c")),
            "https://db.example.com/tasks/1700000000000.json?auth=a%2Bb%2Fc"
        );
    }

    #[test]
    fn test_resource_url_escapes_ids() {
        assert_eq!(
            resource_url("https://db.example.com", &["tasks", "a b/c"], None),
            "https://db.example.com/tasks/a%20b%2Fc.json"
        );
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"error" : "Permission denied"}"#), "Permission denied");
        assert_eq!(error_message("  upstream timeout \n"), "upstream timeout");
        assert_eq!(error_message(""), "request failed");
    }

    #[test]
    fn test_fold_event_emits_full_snapshot() {
        let tree = RefCell::new(SnapshotTree::new());
        let put = json!({
            "path": "/",
            "data": {"1": {"title": "A", "description": "a", "priority": "Low", "state": "todo"}},
        });
        let tasks = fold_event(&tree, StreamEventKind::Put, &put.to_string()).unwrap();
        assert_eq!(tasks.len(), 1);

        let patch = json!({
            "path": "/",
            "data": {"2": {"title": "B", "description": "b", "priority": "High", "state": "done"}},
        });
        let tasks = fold_event(&tree, StreamEventKind::Patch, &patch.to_string()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].id, TaskId::from("2"));
    }

    #[test]
    fn test_fold_event_rejects_garbage() {
        let tree = RefCell::new(SnapshotTree::new());
        assert!(fold_event(&tree, StreamEventKind::Put, "not json").is_err());
    }
}
