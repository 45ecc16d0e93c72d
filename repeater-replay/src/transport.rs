use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use repeater_core::Headers;
use repeater_web::Client;

use crate::error::{FailureKind, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub method: String,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub final_url: String,
}

/// Performs one HTTP exchange. Any status code is a successful exchange; only
/// the lack of a response is an error.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: ExecuteRequest,
    ) -> impl Future<Output = Result<ExecuteResponse, TransportError>> + Send;
}

impl Transport for Client {
    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, TransportError> {
        let uri: Uri = request
            .url
            .parse()
            .map_err(|err| invalid(format!("`{}`: {err}", request.url)))?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| invalid(format!("invalid method `{}`", request.method)))?;
        let mut builder = repeater_web::Request::builder(uri).method(method);
        for header in request.headers.iter().filter(|header| !header.is_pseudo()) {
            let (name, value) = to_header_pair(&header.name, &header.value)?;
            builder = builder.header(name, value);
        }
        let web_request = builder.body(request.body.unwrap_or_default()).build();
        let response = self.request(web_request).await?;

        Ok(ExecuteResponse {
            status: response.status,
            status_text: response.reason,
            headers: from_header_map(&response.headers),
            body: response.body,
            final_url: request.url,
        })
    }
}

fn invalid(message: String) -> TransportError {
    TransportError::new(FailureKind::InvalidRequest, message)
}

fn to_header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), TransportError> {
    let header_name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|_| invalid(format!("invalid header name `{name}`")))?;
    let header_value = HeaderValue::from_str(value.trim())
        .map_err(|_| invalid(format!("invalid value for header `{name}`")))?;
    Ok((header_name, header_value))
}

fn from_header_map(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}
