use std::fmt;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{CoreError, Headers, Response};

const ID_RANDOM_BITS: u32 = 48;

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `{epoch_ms}-{48 random bits as hex}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        let suffix = rand::thread_rng().r#gen::<u64>() & ((1u64 << ID_RANDOM_BITS) - 1);
        Self(format!("{}-{:012x}", now_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    pub host: String,
    pub hostname: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl UrlParts {
    pub fn parse(raw: &str) -> Result<(Url, Self), CoreError> {
        let url = Url::parse(raw).map_err(|err| CoreError::InvalidUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        let hostname = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| CoreError::MissingHost(raw.to_string()))?
            .to_string();
        let host = match url.port() {
            Some(port) => format!("{hostname}:{port}"),
            None => hostname.clone(),
        };
        let parts = Self {
            scheme: url.scheme().to_string(),
            host,
            hostname,
            port: url.port(),
            path: url.path().to_string(),
            query: url.query().map(str::to_string),
            fragment: url.fragment().map(str::to_string),
        };
        Ok((url, parts))
    }

    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

/// A captured or user-authored request. The URL is the source of truth for
/// `url_parts` and `query_params`, which are only ever derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "RequestRecord")]
pub struct Request {
    id: RequestId,
    pub timestamp: i64,
    pub method: String,
    url: String,
    pub headers: Headers,
    query_params: Vec<QueryParam>,
    pub body_text: Option<String>,
    pub body_mime_type: Option<String>,
    url_parts: UrlParts,
    response: Option<Response>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: &str) -> Result<Self, CoreError> {
        Self::with_id(RequestId::generate(), now_millis(), method, url)
    }

    pub fn with_id(
        id: RequestId,
        timestamp: i64,
        method: impl Into<String>,
        url: &str,
    ) -> Result<Self, CoreError> {
        let (parsed, url_parts) = UrlParts::parse(url)?;
        Ok(Self {
            id,
            timestamp,
            method: method.into(),
            url: parsed.to_string(),
            headers: Headers::new(),
            query_params: query_params_of(&parsed),
            body_text: None,
            body_mime_type: None,
            url_parts,
            response: None,
        })
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn url_parts(&self) -> &UrlParts {
        &self.url_parts
    }

    pub fn hostname(&self) -> &str {
        &self.url_parts.hostname
    }

    pub fn query_params(&self) -> &[QueryParam] {
        &self.query_params
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn set_url(&mut self, url: &str) -> Result<(), CoreError> {
        let (parsed, url_parts) = UrlParts::parse(url)?;
        self.url = parsed.to_string();
        self.query_params = query_params_of(&parsed);
        self.url_parts = url_parts;
        Ok(())
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body_text: Option<String>, body_mime_type: Option<String>) -> Self {
        self.body_text = body_text;
        self.body_mime_type = body_mime_type;
        self
    }

    /// Replaces any previously attached response.
    pub fn attach_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    pub fn clear_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    /// Copy with a fresh id and timestamp.
    pub fn duplicate(&self) -> Self {
        Self {
            id: RequestId::generate(),
            timestamp: now_millis(),
            ..self.clone()
        }
    }
}

fn query_params_of(url: &Url) -> Vec<QueryParam> {
    url.query_pairs()
        .map(|(name, value)| QueryParam {
            name: name.into_owned(),
            value: value.into_owned(),
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestRecord {
    id: RequestId,
    timestamp: i64,
    method: String,
    url: String,
    #[serde(default)]
    headers: Headers,
    #[serde(default)]
    body_text: Option<String>,
    #[serde(default)]
    body_mime_type: Option<String>,
    #[serde(default)]
    response: Option<Response>,
}

impl TryFrom<RequestRecord> for Request {
    type Error = CoreError;

    fn try_from(record: RequestRecord) -> Result<Self, Self::Error> {
        let mut request = Request::with_id(record.id, record.timestamp, record.method, &record.url)?;
        request.headers = record.headers;
        request.body_text = record.body_text;
        request.body_mime_type = record.body_mime_type;
        request.response = record.response;
        Ok(request)
    }
}
