use serde::{Deserialize, Serialize};

use crate::Request;

/// Text query matches URL or method as a case-insensitive substring, the method
/// filter is case-insensitive equality. Both must hold; empty values always pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestFilter {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

impl RequestFilter {
    pub fn new(query: Option<String>, method: Option<String>) -> Self {
        Self { query, method }
    }

    pub fn is_empty(&self) -> bool {
        non_empty(&self.query).is_none() && non_empty(&self.method).is_none()
    }

    pub fn matches(&self, request: &Request) -> bool {
        let matches_query = match non_empty(&self.query) {
            Some(query) => {
                let query = query.to_lowercase();
                request.url().to_lowercase().contains(&query)
                    || request.method.to_lowercase().contains(&query)
            }
            None => true,
        };
        let matches_method = match non_empty(&self.method) {
            Some(method) => request.method.eq_ignore_ascii_case(method),
            None => true,
        };
        matches_query && matches_method
    }

    pub fn apply<'a>(&self, requests: impl IntoIterator<Item = &'a Request>) -> Vec<&'a Request> {
        requests
            .into_iter()
            .filter(|request| self.matches(request))
            .collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}
