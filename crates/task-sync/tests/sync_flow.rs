//! End-to-end flows through TaskService against the in-memory store.

use std::cell::Cell;
use std::future;
use std::rc::Rc;

use futures::executor::LocalPool;
use futures::future::{AbortHandle, Abortable};
use futures::task::LocalSpawnExt;

use task_sync::{
    Backoff, Clock, JsonSlotCache, Lanes, LoadPhase, LocalCache, MemorySlots, MemoryStore,
    MutationKind, Priority, RemoteStore, ServiceError, SyncError, Task, TaskDraft, TaskFilter,
    TaskId, TaskService, TaskState, TaskStore, TASKS_COLLECTION,
};

type Service = TaskService<MemoryStore, JsonSlotCache<MemorySlots>>;

fn fixed_clock(ms: u64) -> Clock {
    Rc::new(move || ms)
}

fn service_with(remote: MemoryStore) -> Service {
    TaskService::new(
        remote,
        JsonSlotCache::new(MemorySlots::new()),
        TaskStore::new(),
        fixed_clock(1_700_000_000_000),
    )
}

fn service() -> Service {
    service_with(MemoryStore::new())
}

fn draft(title: &str, description: &str, priority: &str, state: &str) -> TaskDraft {
    TaskDraft {
        title: title.into(),
        description: description.into(),
        priority: priority.into(),
        state: state.into(),
        ..Default::default()
    }
}

fn lane_ids(service: &Service, state: TaskState) -> Vec<String> {
    service.store().with(|c| {
        Lanes::partition(c.tasks(), &TaskFilter::default())
            .get(state)
            .iter()
            .map(|t| t.id.to_string())
            .collect()
    })
}

/// Spawn the subscription loop on `pool`; `sleep` decides how reconnects wait.
fn spawn_subscription<F>(pool: &LocalPool, service: &Service, sleep: fn(std::time::Duration) -> F)
where
    F: future::Future<Output = ()> + 'static,
{
    let svc = service.clone();
    pool.spawner()
        .spawn_local(async move {
            svc.run_subscription(Backoff::default(), sleep).await;
        })
        .expect("spawn subscription");
}

fn no_wait(_: std::time::Duration) -> future::Ready<()> {
    future::ready(())
}

fn wait_forever(_: std::time::Duration) -> future::Pending<()> {
    future::pending()
}

#[tokio::test]
async fn test_create_assigns_unique_ids_and_caches() {
    let service = service();
    let first = service.create(&draft("a", "d", "Low", "todo")).await.unwrap();
    let second = service.create(&draft("b", "d", "High", "done")).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.id.as_str(), "1700000000000");
    assert_eq!(second.id.as_str(), "1700000000001");

    let cached = service.cache().load_all().unwrap();
    assert_eq!(cached, vec![first.clone(), second.clone()]);
    assert_eq!(service.remote().get(TASKS_COLLECTION, &first.id), Some(first));
    assert_eq!(service.store().with(|c| c.len()), 2);
}

#[tokio::test]
async fn test_invalid_draft_never_reaches_remote() {
    let service = service();
    let err = service.create(&draft("", "d", "Low", "todo")).await.unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(service.remote().snapshot(TASKS_COLLECTION).is_empty());
    assert!(service.cache().load_all().unwrap().is_empty());
    assert!(service.store().with(|c| c.mutation_error().is_none()));
}

#[tokio::test]
async fn test_failed_create_is_surfaced_and_not_added() {
    let service = service();
    service
        .remote()
        .fail_next_write(SyncError::Network("offline".into()));

    let err = service.create(&draft("a", "d", "Low", "todo")).await.unwrap_err();
    assert_eq!(err, ServiceError::Sync(SyncError::Network("offline".into())));

    service.store().with(|c| {
        assert!(c.is_empty());
        let failure = c.mutation_error().unwrap();
        assert_eq!(failure.kind, MutationKind::Create);
    });
    assert!(service.cache().load_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_update_rolls_back() {
    let service = service();
    let task = service.create(&draft("a", "d", "Low", "todo")).await.unwrap();

    service
        .remote()
        .fail_next_write(SyncError::from_status(503, "busy"));
    let mut edit = TaskDraft::from_task(&task);
    edit.state = "done".into();
    assert!(service.update(&task.id, &edit).await.is_err());

    service.store().with(|c| {
        assert_eq!(c.get(&task.id), Some(&task));
        assert_eq!(c.mutation_error().map(|f| f.kind), Some(MutationKind::Update));
    });
    assert_eq!(service.remote().get(TASKS_COLLECTION, &task.id), Some(task));
}

#[tokio::test]
async fn test_update_unknown_task() {
    let service = service();
    let err = service
        .update(&TaskId::from("404"), &draft("a", "d", "Low", "todo"))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::NotFound(TaskId::from("404")));
}

#[tokio::test]
async fn test_failed_delete_restores_position() {
    let service = service();
    let a = service.create(&draft("a", "d", "Low", "todo")).await.unwrap();
    let b = service.create(&draft("b", "d", "Low", "todo")).await.unwrap();
    let c = service.create(&draft("c", "d", "Low", "todo")).await.unwrap();

    service
        .remote()
        .fail_next_delete(SyncError::Network("offline".into()));
    assert!(service.delete(&b.id).await.is_err());

    let ids: Vec<_> = service
        .store()
        .with(|col| col.tasks().iter().map(|t| t.id.clone()).collect());
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn test_delete_twice_same_end_state() {
    let service = service();
    let task = service.create(&draft("a", "d", "Low", "todo")).await.unwrap();

    service.delete(&task.id).await.unwrap();
    let after_once = service.store().snapshot();
    service.delete(&task.id).await.unwrap();

    assert_eq!(service.store().snapshot(), after_once);
    assert!(service.remote().snapshot(TASKS_COLLECTION).is_empty());
}

#[tokio::test]
async fn test_bootstrap_hydrates_from_cache() {
    let slots = MemorySlots::new();
    let cache = JsonSlotCache::new(slots);
    let cached = Task::new(TaskId::from("1"), "cached", "d", Priority::Medium, TaskState::Doing);
    cache.append(&cached).unwrap();

    let service = TaskService::new(MemoryStore::new(), cache, TaskStore::new(), fixed_clock(1));
    assert_eq!(service.bootstrap(), 1);
    assert_eq!(service.store().with(|c| c.get(&cached.id).cloned()), Some(cached));
}

#[test]
fn test_written_record_arrives_in_next_snapshot() {
    let mut pool = LocalPool::new();
    let service = service();
    spawn_subscription(&pool, &service, no_wait);
    pool.run_until_stalled();
    assert_eq!(service.store().with(|c| c.phase()), LoadPhase::Ready);

    // Written by another client, so only the snapshot can bring it in
    let task = Task::new(
        TaskId::from("77"),
        "remote",
        "from elsewhere",
        Priority::High,
        TaskState::Done,
    )
    .with_image("https://example.com/x.png");
    pool.run_until(service.remote().write(TASKS_COLLECTION, &task.id, &task))
        .unwrap();
    pool.run_until_stalled();

    assert_eq!(service.store().with(|c| c.get(&task.id).cloned()), Some(task));
}

#[test]
fn test_aborted_subscription_ignores_snapshots_but_writes_land() {
    let mut pool = LocalPool::new();
    let service = service();
    let (abort, registration) = AbortHandle::new_pair();
    let svc = service.clone();
    pool.spawner()
        .spawn_local(async move {
            let run = svc.run_subscription(Backoff::default(), no_wait);
            let _ = Abortable::new(run, registration).await;
        })
        .expect("spawn subscription");
    pool.run_until_stalled();
    assert_eq!(service.remote().subscriber_count(), 1);

    // A write started before teardown still completes afterwards
    let task = Task::new(TaskId::from("5"), "late", "d", Priority::Low, TaskState::Todo);
    let write = service.remote().write(TASKS_COLLECTION, &task.id, &task);
    abort.abort();
    pool.run_until_stalled();
    pool.run_until(write).unwrap();
    pool.run_until_stalled();

    assert!(service.store().with(|c| c.is_empty()));
    assert_eq!(service.remote().get(TASKS_COLLECTION, &task.id), Some(task));
    assert_eq!(service.remote().subscriber_count(), 0);
}

#[test]
fn test_create_then_snapshot_keeps_single_copy() {
    let mut pool = LocalPool::new();
    let service = service();
    spawn_subscription(&pool, &service, no_wait);
    pool.run_until_stalled();

    let task = pool
        .run_until(service.create(&draft("once", "d", "Low", "todo")))
        .unwrap();
    pool.run_until_stalled();

    service.store().with(|c| {
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(&task.id), Some(&task));
    });
}

#[test]
fn test_buy_milk_moves_across_lanes() {
    let mut pool = LocalPool::new();
    let service = service();
    spawn_subscription(&pool, &service, no_wait);
    pool.run_until_stalled();

    let task = pool
        .run_until(service.create(&draft("Buy milk", "2%", "Low", "todo")))
        .unwrap();
    pool.run_until_stalled();
    assert_eq!(lane_ids(&service, TaskState::Todo), vec![task.id.to_string()]);
    assert!(lane_ids(&service, TaskState::Doing).is_empty());

    let mut edit = TaskDraft::from_task(&task);
    edit.state = "doing".into();
    pool.run_until(service.update(&task.id, &edit)).unwrap();
    pool.run_until_stalled();
    assert!(lane_ids(&service, TaskState::Todo).is_empty());
    assert_eq!(lane_ids(&service, TaskState::Doing), vec![task.id.to_string()]);

    pool.run_until(service.delete(&task.id)).unwrap();
    pool.run_until_stalled();
    for state in TaskState::ALL {
        assert!(lane_ids(&service, state).is_empty());
    }
}

#[test]
fn test_fetch_failure_keeps_rendered_tasks() {
    let mut pool = LocalPool::new();
    let existing = Task::new(TaskId::from("1"), "visible", "d", Priority::Low, TaskState::Todo);
    let service = service_with(MemoryStore::with_tasks(TASKS_COLLECTION, [existing.clone()]));
    spawn_subscription(&pool, &service, wait_forever);
    pool.run_until_stalled();

    service
        .remote()
        .interrupt(SyncError::Network("network down".into()));
    pool.run_until_stalled();

    service.store().with(|c| {
        assert_eq!(c.tasks(), &[existing]);
        assert_eq!(c.error().map(ToString::to_string).as_deref(), Some("network down"));
    });
}

#[test]
fn test_transient_failure_resubscribes() {
    let mut pool = LocalPool::new();
    let existing = Task::new(TaskId::from("1"), "t", "d", Priority::Low, TaskState::Todo);
    let service = service_with(MemoryStore::with_tasks(TASKS_COLLECTION, [existing]));
    service
        .remote()
        .fail_next_subscribe(SyncError::Network("flaky".into()));

    let sleeps = Rc::new(Cell::new(0u32));
    let counter = sleeps.clone();
    let svc = service.clone();
    pool.spawner()
        .spawn_local(async move {
            svc.run_subscription(Backoff::default(), move |_| {
                counter.set(counter.get() + 1);
                future::ready(())
            })
            .await;
        })
        .unwrap();
    pool.run_until_stalled();

    assert_eq!(sleeps.get(), 1);
    assert_eq!(service.remote().subscriber_count(), 1);
    service.store().with(|c| {
        assert_eq!(c.len(), 1);
        assert!(c.error().is_none());
    });
}

#[test]
fn test_fatal_failure_stops_the_loop() {
    let mut pool = LocalPool::new();
    let service = service();
    service
        .remote()
        .fail_next_subscribe(SyncError::PermissionDenied("rules".into()));

    let err = pool.run_until(service.run_subscription(Backoff::default(), no_wait));
    assert_eq!(err, SyncError::PermissionDenied("rules".into()));
    assert_eq!(service.store().with(|c| c.error().cloned()), Some(err));
}

#[test]
fn test_gives_up_after_max_attempts() {
    let mut pool = LocalPool::new();
    let service = service();
    for _ in 0..3 {
        service.remote().fail_next_subscribe(SyncError::StreamClosed);
    }

    let backoff = Backoff::default().with_max_attempts(2);
    let err = pool.run_until(service.run_subscription(backoff, no_wait));
    assert_eq!(err, SyncError::RetriesExhausted(2));
}

#[test]
fn test_snapshot_replaces_cache_only_tasks() {
    let mut pool = LocalPool::new();
    let remote_task = Task::new(TaskId::from("2"), "remote", "d", Priority::Low, TaskState::Todo);
    let cache = JsonSlotCache::new(MemorySlots::new());
    cache
        .append(&Task::new(TaskId::from("1"), "stale", "d", Priority::Low, TaskState::Todo))
        .unwrap();
    let service = TaskService::new(
        MemoryStore::with_tasks(TASKS_COLLECTION, [remote_task.clone()]),
        cache,
        TaskStore::new(),
        fixed_clock(5),
    );

    service.bootstrap();
    assert_eq!(service.store().with(|c| c.len()), 1);

    let svc = service.clone();
    pool.spawner()
        .spawn_local(async move {
            svc.run_subscription(Backoff::default(), no_wait).await;
        })
        .unwrap();
    pool.run_until_stalled();

    assert_eq!(service.store().with(|c| c.tasks().to_vec()), vec![remote_task]);
}
