use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use repeater_core::{Request, RequestId, Response};

use crate::index::{InsertOutcome, RequestIndex};
use crate::snapshot::RequestSnapshot;

/// Handle to one index. Every operation holds the lock for its whole duration, so
/// no reader can see a half-applied insert, delete or clear.
#[derive(Debug, Clone, Default)]
pub struct SharedIndex {
    inner: Arc<Mutex<RequestIndex>>,
}

impl SharedIndex {
    pub fn new(index: RequestIndex) -> Self {
        Self {
            inner: Arc::new(Mutex::new(index)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RequestIndex> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, request: Request) -> InsertOutcome {
        self.lock().insert(request)
    }

    pub fn delete(&self, id: &RequestId) -> Option<Request> {
        self.lock().delete(id)
    }

    pub fn clear(&self) -> usize {
        self.lock().clear()
    }

    pub fn get(&self, id: &RequestId) -> Option<Request> {
        self.lock().get(id).cloned()
    }

    pub fn get_all(&self) -> Vec<Request> {
        self.lock().get_all()
    }

    pub fn list_by_domain(&self) -> BTreeMap<String, Vec<Request>> {
        self.lock().list_by_domain()
    }

    pub fn count(&self) -> usize {
        self.lock().count()
    }

    pub fn domain_count(&self) -> usize {
        self.lock().domain_count()
    }

    pub fn set_max_stored(&self, max_stored: usize) -> Vec<Request> {
        self.lock().set_max_stored(max_stored)
    }

    pub fn attach_response(&self, id: &RequestId, response: Response) -> bool {
        self.lock().attach_response(id, response)
    }

    pub fn attach_body(
        &self,
        id: &RequestId,
        expected: &Response,
        body_text: String,
        size_bytes: u64,
    ) -> bool {
        self.lock().attach_body(id, expected, body_text, size_bytes)
    }

    pub fn snapshot(&self, limit: usize) -> RequestSnapshot {
        self.lock().snapshot(limit)
    }

    pub fn read<R>(&self, f: impl FnOnce(&RequestIndex) -> R) -> R {
        f(&self.lock())
    }
}
