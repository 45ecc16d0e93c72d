use std::time::Instant;

use repeater_codec::{DecodeOptions, RequestFields, decode};
use repeater_core::{Headers, Request, Response, UrlParts, materialize_body};

use crate::error::ReplayError;
use crate::transport::{ExecuteRequest, Transport};

const CREDENTIAL_HEADERS: [&str; 2] = ["cookie", "authorization"];

/// What gets sent: the editable parts of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRequest {
    pub method: String,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

impl From<&Request> for ReplayRequest {
    fn from(request: &Request) -> Self {
        Self {
            method: request.method.clone(),
            url: request.url().to_string(),
            headers: request.headers.clone(),
            body: request.body_text.clone(),
        }
    }
}

impl From<RequestFields> for ReplayRequest {
    fn from(fields: RequestFields) -> Self {
        Self {
            method: fields.method,
            url: fields.url,
            headers: fields.headers,
            body: fields.body,
        }
    }
}

/// GET and HEAD never carry a body, whatever the edited text says.
pub fn has_body_semantics(method: &str) -> bool {
    !(method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD"))
}

pub struct ReplayService<T> {
    transport: T,
    include_credentials: bool,
}

impl<T: Transport> ReplayService<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            include_credentials: true,
        }
    }

    pub fn with_credentials(mut self, include_credentials: bool) -> Self {
        self.include_credentials = include_credentials;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends once. Every HTTP status comes back as `Ok`; only a missing
    /// response is an error.
    pub async fn replay(&self, request: ReplayRequest) -> Result<Response, ReplayError> {
        let method = request.method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(ReplayError::InvalidRequest("method is empty".to_string()));
        }
        UrlParts::parse(&request.url).map_err(|err| ReplayError::InvalidRequest(err.to_string()))?;

        let mut headers = request.headers;
        if !self.include_credentials {
            for name in CREDENTIAL_HEADERS {
                headers.remove(name);
            }
        }
        let body = request
            .body
            .filter(|_| has_body_semantics(&method))
            .map(String::into_bytes);

        tracing::debug!(%method, url = %request.url, "replaying request");
        let started = Instant::now();
        let outcome = self
            .transport
            .execute(ExecuteRequest {
                method: method.clone(),
                url: request.url.clone(),
                headers,
                body,
            })
            .await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let executed = match outcome {
            Ok(executed) => executed,
            Err(err) => {
                tracing::warn!(%method, url = %request.url, kind = %err.kind, error = %err.message, "replay failed");
                return Err(err.into());
            }
        };

        let content_type = executed.headers.get("content-type").map(str::to_string);
        let body_text = materialize_body(content_type.as_deref(), &executed.body);
        Ok(Response {
            status: executed.status,
            status_text: executed.status_text,
            headers: executed.headers,
            body_text,
            duration_ms,
            size_bytes: executed.body.len() as u64,
            content_type,
        })
    }

    /// Decodes raw request text with `options` and replays it.
    pub async fn replay_raw(&self, text: &str, options: &DecodeOptions) -> Result<Response, ReplayError> {
        let fields = decode(text, options)?;
        self.replay(fields.into()).await
    }
}
