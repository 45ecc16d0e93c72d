use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use repeater_core::Request;
use repeater_storage::{
    KeyValueStore, MemoryStore, REQUEST_COUNT_KEY, RequestIndex, SharedIndex, SnapshotWorkerConfig,
    load_snapshot, restore_index, spawn_snapshot_worker,
};
use serde_json::{Map, Value};

#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl KeyValueStore for CountingStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, String> {
        self.inner.get(keys)
    }

    fn set(&self, entries: Map<String, Value>) -> Result<(), String> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(entries)
    }
}

struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _keys: &[&str]) -> Result<Map<String, Value>, String> {
        Err("quota exceeded".to_string())
    }

    fn set(&self, _entries: Map<String, Value>) -> Result<(), String> {
        Err("quota exceeded".to_string())
    }
}

fn config(debounce_ms: u64) -> SnapshotWorkerConfig {
    SnapshotWorkerConfig {
        debounce: Duration::from_millis(debounce_ms),
        recent_limit: 100,
    }
}

fn request(url: &str) -> Request {
    Request::new("GET", url).unwrap()
}

#[test]
fn burst_of_changes_writes_once() {
    let index = SharedIndex::default();
    let store = Arc::new(CountingStore::default());
    let handle = spawn_snapshot_worker(index.clone(), store.clone(), config(200));

    for n in 0..5 {
        index.insert(request(&format!("https://a.com/{n}")));
        handle.schedule();
    }
    std::thread::sleep(Duration::from_millis(700));

    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    let snapshot = load_snapshot(store.as_ref()).unwrap();
    assert_eq!(snapshot.request_count, 5);
    assert_eq!(snapshot.recent_requests.len(), 5);
    assert_eq!(snapshot.recent_requests[0].url(), "https://a.com/4");
}

#[test]
fn flush_writes_pending_snapshot_immediately() {
    let index = SharedIndex::default();
    let store = Arc::new(CountingStore::default());
    let handle = spawn_snapshot_worker(index.clone(), store.clone(), config(60_000));

    index.insert(request("https://a.com/"));
    handle.schedule();
    handle.flush().unwrap();

    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    let stored = store.get(&[REQUEST_COUNT_KEY]).unwrap();
    assert_eq!(stored[REQUEST_COUNT_KEY], 1);
}

#[test]
fn flush_without_changes_does_not_write() {
    let store = Arc::new(CountingStore::default());
    let handle = spawn_snapshot_worker(SharedIndex::default(), store.clone(), config(50));
    handle.flush().unwrap();
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[test]
fn dropping_handle_flushes_pending_write() {
    let index = SharedIndex::default();
    let store = Arc::new(CountingStore::default());
    let handle = spawn_snapshot_worker(index.clone(), store.clone(), config(60_000));

    index.insert(request("https://a.com/"));
    handle.schedule();
    drop(handle);
    std::thread::sleep(Duration::from_millis(300));

    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_store_is_swallowed() {
    let index = SharedIndex::default();
    let handle = spawn_snapshot_worker(index.clone(), Arc::new(FailingStore), config(10));

    index.insert(request("https://a.com/"));
    handle.schedule();
    handle.flush().unwrap();
    handle.schedule();
    std::thread::sleep(Duration::from_millis(100));

    assert_eq!(index.count(), 1);
    handle.flush().unwrap();
}

#[test]
fn restore_rebuilds_order_and_groups() {
    let store = MemoryStore::new();
    let mut index = RequestIndex::default();
    for url in ["https://a.com/1", "https://b.com/1", "https://a.com/2"] {
        index.insert(request(url));
    }
    index.snapshot(100).write(&store).unwrap();

    let restored = restore_index(&store, 1000, 100);
    assert_eq!(restored.get_all(), index.get_all());
    assert_eq!(restored.list_by_domain()["a.com"].len(), 2);
}

#[test]
fn restore_from_failing_store_is_empty() {
    let restored = restore_index(&FailingStore, 1000, 100);
    assert!(restored.is_empty());
}

#[test]
fn restore_skips_unreadable_entries() {
    let store = MemoryStore::new();
    let good = request("https://a.com/");
    let mut entries = Map::new();
    entries.insert(
        "recentRequests".to_string(),
        serde_json::json!([serde_json::to_value(&good).unwrap(), { "id": "x", "url": "nope" }]),
    );
    store.set(entries).unwrap();

    let restored = restore_index(&store, 1000, 100);
    assert_eq!(restored.get_all(), vec![good]);
}
