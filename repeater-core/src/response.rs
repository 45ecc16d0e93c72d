use serde::{Deserialize, Serialize};

use crate::Headers;

/// Outcome of one executed or captured exchange. Once attached to a request it is
/// only ever replaced, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub body_text: String,
    pub duration_ms: f64,
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

impl Response {
    pub fn with_body(&self, body_text: String, size_bytes: u64) -> Self {
        Self {
            body_text,
            size_bytes,
            ..self.clone()
        }
    }
}
