use repeater_core::Request;
use serde_json::{Map, Value};

use crate::index::RequestIndex;
use crate::store::KeyValueStore;

pub const RECENT_REQUESTS_KEY: &str = "recentRequests";
pub const REQUEST_COUNT_KEY: &str = "requestCount";
pub const DEFAULT_RECENT_LIMIT: usize = 100;

/// The persisted view of the index: the newest requests and the total count at
/// the time the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSnapshot {
    pub recent_requests: Vec<Request>,
    pub request_count: usize,
}

impl RequestSnapshot {
    pub fn write(&self, store: &dyn KeyValueStore) -> Result<(), String> {
        let recent = serde_json::to_value(&self.recent_requests).map_err(|err| err.to_string())?;
        let mut entries = Map::new();
        entries.insert(RECENT_REQUESTS_KEY.to_string(), recent);
        entries.insert(
            REQUEST_COUNT_KEY.to_string(),
            Value::from(self.request_count as u64),
        );
        store.set(entries)
    }
}

/// Reads the last snapshot. Entries that no longer parse are skipped.
pub fn load_snapshot(store: &dyn KeyValueStore) -> Result<RequestSnapshot, String> {
    let mut values = store.get(&[RECENT_REQUESTS_KEY, REQUEST_COUNT_KEY])?;
    let recent_requests = match values.remove(RECENT_REQUESTS_KEY) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Request>(item) {
                Ok(request) => Some(request),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable stored request");
                    None
                }
            })
            .collect(),
        Some(other) => {
            tracing::warn!(kind = ?other, "stored recentRequests is not an array");
            Vec::new()
        }
        None => Vec::new(),
    };
    let request_count = values
        .get(REQUEST_COUNT_KEY)
        .and_then(Value::as_u64)
        .map(|count| count as usize)
        .unwrap_or(recent_requests.len());
    Ok(RequestSnapshot {
        recent_requests,
        request_count,
    })
}

/// Rebuilds an index from the stored snapshot, inserting oldest-first so the
/// newest request ends up at the head. A failing store yields an empty index.
pub fn restore_index(store: &dyn KeyValueStore, max_stored: usize, recent_limit: usize) -> RequestIndex {
    let mut index = RequestIndex::new(max_stored);
    let snapshot = match load_snapshot(store) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load stored requests");
            return index;
        }
    };
    for request in snapshot
        .recent_requests
        .into_iter()
        .take(recent_limit)
        .rev()
    {
        index.insert(request);
    }
    tracing::debug!(restored = index.count(), "restored request index");
    index
}
