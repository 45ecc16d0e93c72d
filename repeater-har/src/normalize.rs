use chrono::DateTime;
use repeater_core::{Headers, Request, RequestId, Response, now_millis};

use crate::body::CapturedBody;
use crate::error::NormalizeError;
use crate::model::{HarEntry, HarFile, HarHeader, HarResponse, HarTimings};

/// Builds a request record from one entry, attaching the response when present.
/// Response body text is filled from inline content only; a body fetched later
/// goes through [`CapturedBody::materialize`].
pub fn normalize_entry(entry: &HarEntry) -> Result<Request, NormalizeError> {
    let har_request = entry.request.as_ref().ok_or(NormalizeError::MissingRequest)?;
    let har_response = entry.response.as_ref().ok_or(NormalizeError::MissingResponse)?;

    let timestamp = entry
        .started_date_time
        .as_deref()
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|value| value.timestamp_millis())
        .unwrap_or_else(now_millis);

    let headers = to_headers(&har_request.headers);
    let (body_text, body_mime_type) = match &har_request.post_data {
        Some(post) => (
            post.text.clone().filter(|text| !text.is_empty()),
            post.mime_type
                .clone()
                .or_else(|| headers.get("content-type").map(str::to_string)),
        ),
        None => (None, None),
    };

    let mut request = Request::with_id(
        RequestId::generate(),
        timestamp,
        har_request.method.to_ascii_uppercase(),
        &har_request.url,
    )?
    .with_headers(headers)
    .with_body(body_text, body_mime_type);

    let duration_ms = entry
        .timings
        .as_ref()
        .map(total_duration)
        .or(entry.time)
        .unwrap_or(0.0)
        .max(0.0);
    request.attach_response(to_response(har_response, duration_ms));
    Ok(request)
}

/// Parses and normalizes a single entry given as JSON text.
pub fn normalize_json(raw: &str) -> Result<Request, NormalizeError> {
    let entry: HarEntry =
        serde_json::from_str(raw).map_err(|err| NormalizeError::InvalidJson(err.to_string()))?;
    normalize_entry(&entry)
}

/// Entries of a whole HAR export, in file order.
pub fn parse_log(raw: &str) -> Result<Vec<HarEntry>, NormalizeError> {
    let file: HarFile =
        serde_json::from_str(raw).map_err(|err| NormalizeError::InvalidJson(err.to_string()))?;
    Ok(file.log.entries)
}

/// Sum of all phases, counting the `-1` "not applicable" marker as zero.
pub fn total_duration(timings: &HarTimings) -> f64 {
    [
        timings.blocked,
        timings.dns,
        timings.connect,
        timings.send,
        timings.wait,
        timings.receive,
        timings.ssl,
    ]
    .into_iter()
    .flatten()
    .filter(|phase| *phase > 0.0)
    .sum()
}

fn to_headers(headers: &[HarHeader]) -> Headers {
    headers
        .iter()
        .map(|header| (header.name.clone(), header.value.clone()))
        .collect()
}

fn to_response(response: &HarResponse, duration_ms: f64) -> Response {
    let headers = to_headers(&response.headers);
    let content_type = response
        .content
        .mime_type
        .clone()
        .filter(|mime| !mime.is_empty())
        .or_else(|| headers.get("content-type").map(str::to_string));

    let inline = response
        .content
        .text
        .as_ref()
        .map(|text| CapturedBody::new(text.clone(), response.content.encoding.clone()));
    let (body_text, inline_size) = match &inline {
        Some(body) => body.materialize(content_type.as_deref()),
        None => (String::new(), 0),
    };
    let size_bytes = response
        .content
        .size
        .or(response.body_size)
        .map(|size| size.max(0) as u64)
        .unwrap_or(inline_size);

    Response {
        status: response.status,
        status_text: response.status_text.clone(),
        headers,
        body_text,
        duration_ms,
        size_bytes,
        content_type,
    }
}
