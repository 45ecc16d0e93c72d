use std::collections::{BTreeMap, HashMap, VecDeque};

use repeater_core::{Request, RequestId, Response};

use crate::snapshot::RequestSnapshot;

pub const DEFAULT_MAX_STORED: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOutcome {
    pub replaced: bool,
    pub evicted: Vec<Request>,
}

/// Captured requests, most-recent-first, grouped by hostname.
///
/// `flat` and every domain bucket share the same relative order, and every id in
/// `flat` appears in exactly one bucket. The globally oldest entry is evicted
/// once `max_stored` is exceeded.
#[derive(Debug, Clone)]
pub struct RequestIndex {
    max_stored: usize,
    entries: HashMap<RequestId, Request>,
    flat: VecDeque<RequestId>,
    by_domain: HashMap<String, VecDeque<RequestId>>,
}

impl Default for RequestIndex {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STORED)
    }
}

impl RequestIndex {
    pub fn new(max_stored: usize) -> Self {
        Self {
            max_stored: max_stored.max(1),
            entries: HashMap::new(),
            flat: VecDeque::new(),
            by_domain: HashMap::new(),
        }
    }

    pub fn max_stored(&self) -> usize {
        self.max_stored
    }

    pub fn set_max_stored(&mut self, max_stored: usize) -> Vec<Request> {
        self.max_stored = max_stored.max(1);
        self.enforce_capacity()
    }

    /// Prepends a new request, or replaces an existing id where it already sits.
    pub fn insert(&mut self, request: Request) -> InsertOutcome {
        let id = request.id().clone();
        let domain = request.hostname().to_string();

        if let Some(previous) = self.entries.insert(id.clone(), request) {
            if previous.hostname() != domain {
                self.remove_from_bucket(previous.hostname(), &id);
                self.rebuild_bucket(&domain);
            }
            return InsertOutcome {
                replaced: true,
                evicted: Vec::new(),
            };
        }

        self.flat.push_front(id.clone());
        self.by_domain.entry(domain).or_default().push_front(id);
        InsertOutcome {
            replaced: false,
            evicted: self.enforce_capacity(),
        }
    }

    pub fn delete(&mut self, id: &RequestId) -> Option<Request> {
        let request = self.entries.remove(id)?;
        self.flat.retain(|existing| existing != id);
        self.remove_from_bucket(request.hostname(), id);
        Some(request)
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.flat.len();
        self.entries.clear();
        self.flat.clear();
        self.by_domain.clear();
        removed
    }

    pub fn get(&self, id: &RequestId) -> Option<&Request> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.flat.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn get_all(&self) -> Vec<Request> {
        self.iter().cloned().collect()
    }

    pub fn list_by_domain(&self) -> BTreeMap<String, Vec<Request>> {
        self.by_domain
            .iter()
            .map(|(domain, ids)| {
                let requests = ids
                    .iter()
                    .filter_map(|id| self.entries.get(id))
                    .cloned()
                    .collect();
                (domain.clone(), requests)
            })
            .collect()
    }

    pub fn count(&self) -> usize {
        self.flat.len()
    }

    pub fn domain_count(&self) -> usize {
        self.by_domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub fn attach_response(&mut self, id: &RequestId, response: Response) -> bool {
        match self.entries.get_mut(id) {
            Some(request) => {
                request.attach_response(response);
                true
            }
            None => false,
        }
    }

    /// Swaps in a copy of the attached response carrying the late-arriving body.
    /// Does nothing once `expected` is no longer the attached response, so a
    /// body that arrives after a resend or an edit is discarded.
    pub fn attach_body(
        &mut self,
        id: &RequestId,
        expected: &Response,
        body_text: String,
        size_bytes: u64,
    ) -> bool {
        let Some(request) = self.entries.get_mut(id) else {
            return false;
        };
        let Some(response) = request.response().filter(|current| *current == expected) else {
            return false;
        };
        let updated = response.with_body(body_text, size_bytes);
        request.attach_response(updated);
        true
    }

    pub fn snapshot(&self, limit: usize) -> RequestSnapshot {
        RequestSnapshot {
            recent_requests: self.iter().take(limit).cloned().collect(),
            request_count: self.count(),
        }
    }

    fn enforce_capacity(&mut self) -> Vec<Request> {
        let mut evicted = Vec::new();
        while self.flat.len() > self.max_stored {
            let Some(id) = self.flat.pop_back() else {
                break;
            };
            if let Some(request) = self.entries.remove(&id) {
                self.remove_from_bucket(request.hostname(), &id);
                evicted.push(request);
            }
        }
        evicted
    }

    fn remove_from_bucket(&mut self, domain: &str, id: &RequestId) {
        if let Some(bucket) = self.by_domain.get_mut(domain) {
            bucket.retain(|existing| existing != id);
            if bucket.is_empty() {
                self.by_domain.remove(domain);
            }
        }
    }

    fn rebuild_bucket(&mut self, domain: &str) {
        let bucket: VecDeque<RequestId> = self
            .flat
            .iter()
            .filter(|id| {
                self.entries
                    .get(*id)
                    .is_some_and(|request| request.hostname() == domain)
            })
            .cloned()
            .collect();
        if bucket.is_empty() {
            self.by_domain.remove(domain);
        } else {
            self.by_domain.insert(domain.to_string(), bucket);
        }
    }
}
