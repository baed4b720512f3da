use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use notesync_core::{CollectionId, FileRecord, SyncOutcome};
use notesync_sync::{run_batch, BatchOptions, BatchReport, MemoryStore, Orchestrator, RemoteError};
use tokio::time::Instant;

fn db() -> CollectionId {
    CollectionId::from("db")
}

fn note(stem: &str) -> FileRecord {
    FileRecord::parse(format!("/vault/resource/{stem}.md"), "body", None).unwrap()
}

#[tokio::test(start_paused = true)]
async fn pacing_follows_only_created_pages() {
    let store = Arc::new(MemoryStore::new());
    store.seed(&db(), "b");
    let orch = Orchestrator::new(store.clone(), "hubs");
    let options = BatchOptions::default();
    let files = vec![note("a"), note("b"), note("c")];

    let start = Instant::now();
    let (items, report) = BatchReport::collect(run_batch(&orch, files, &db(), &options)).await;

    // a created → pause; b skipped → no pause; c created is last → no pause.
    assert_eq!(start.elapsed(), Duration::from_millis(350));
    assert_eq!(items.len(), 3);
    assert_eq!(items[1].outcome, SyncOutcome::SkippedExists);
    assert_eq!(report.created, 2);
    assert_eq!(report.skipped, 1);
}

#[tokio::test(start_paused = true)]
async fn files_are_processed_in_order_one_at_a_time() {
    let store = Arc::new(MemoryStore::new());
    let orch = Orchestrator::new(store.clone(), "hubs");
    let options = BatchOptions {
        pacing: Duration::from_secs(1),
        ..BatchOptions::default()
    };
    let files = vec![note("one"), note("two"), note("three")];

    let db_id = db();
    let mut stream = Box::pin(run_batch(&orch, files, &db_id, &options));
    let first = stream.next().await.unwrap();
    assert_eq!(first.file.filename_stem, "one");
    assert_eq!(store.create_calls(), 1);

    let start = Instant::now();
    let second = stream.next().await.unwrap();
    assert_eq!(second.file.filename_stem, "two");
    assert_eq!(start.elapsed(), Duration::from_secs(1));
    assert_eq!(store.create_calls(), 2);

    let names: Vec<_> = store
        .live_pages(&db())
        .iter()
        .map(|p| p.properties.name.clone())
        .collect();
    assert_eq!(names, vec!["one", "two"]);
}

#[tokio::test]
async fn failure_does_not_stop_the_batch() {
    let store = Arc::new(MemoryStore::new());
    store.fail_next_create(RemoteError::validation("nope"));
    let orch = Orchestrator::new(store.clone(), "hubs");
    let options = BatchOptions {
        pacing: Duration::ZERO,
        ..BatchOptions::default()
    };

    let (items, report) =
        BatchReport::collect(run_batch(&orch, vec![note("a"), note("b")], &db(), &options)).await;
    assert_eq!(items.len(), 2);
    assert!(items[0].outcome.is_failed());
    assert_eq!(report.failed, 1);
    assert_eq!(report.created, 1);
}

#[tokio::test]
async fn abort_on_failure_yields_failure_then_ends() {
    let store = Arc::new(MemoryStore::new());
    store.fail_next_create(RemoteError::validation("nope"));
    let orch = Orchestrator::new(store.clone(), "hubs");
    let options = BatchOptions {
        pacing: Duration::ZERO,
        abort_on_failure: true,
        ..BatchOptions::default()
    };

    let items: Vec<_> = run_batch(&orch, vec![note("a"), note("b")], &db(), &options)
        .collect()
        .await;
    assert_eq!(items.len(), 1);
    assert!(items[0].outcome.is_failed());
    assert_eq!(store.create_calls(), 1);
}

#[tokio::test]
async fn stream_is_lazy() {
    let store = Arc::new(MemoryStore::new());
    let orch = Orchestrator::new(store.clone(), "hubs");
    let options = BatchOptions::default();
    let db_id = db();
    let stream = run_batch(&orch, vec![note("a")], &db_id, &options);
    assert_eq!(store.query_calls(), 0);
    drop(stream);
    assert_eq!(store.query_calls(), 0);
}
