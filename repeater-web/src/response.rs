use std::io::Read;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, HeaderName, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderValue};

use crate::RequestError;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[derive(Debug)]
struct ResponseHead {
    status: u16,
    reason: String,
    headers: HeaderMap,
    body_start: usize,
}

enum BodyFraming {
    Empty,
    Length(usize),
    Chunked,
    UntilClose,
}

/// True once `bytes` holds a full response, so the reader can stop without
/// waiting for the peer to close.
pub(crate) fn is_complete(bytes: &[u8], head_only: bool) -> bool {
    let Ok(Some(head)) = parse_head(bytes) else {
        return false;
    };
    let body = &bytes[head.body_start..];
    match framing(&head, head_only) {
        BodyFraming::Empty => true,
        BodyFraming::Length(len) => body.len() >= len,
        BodyFraming::Chunked => dechunk(body).is_ok(),
        BodyFraming::UntilClose => false,
    }
}

/// True when the body is delimited by the peer closing the connection, so an
/// abrupt close after the head still yields a usable response.
pub(crate) fn reads_until_close(bytes: &[u8], head_only: bool) -> bool {
    match parse_head(bytes) {
        Ok(Some(head)) => matches!(framing(&head, head_only), BodyFraming::UntilClose),
        _ => false,
    }
}

pub(crate) fn parse_response(bytes: &[u8], head_only: bool) -> Result<Response, RequestError> {
    let head = parse_head(bytes)?
        .ok_or_else(|| RequestError::InvalidResponse("incomplete response head".to_string()))?;
    let raw_body = &bytes[head.body_start..];
    let body = match framing(&head, head_only) {
        BodyFraming::Empty => Vec::new(),
        BodyFraming::Length(len) if raw_body.len() < len => {
            return Err(RequestError::InvalidResponse(format!(
                "truncated body: expected {len} bytes, received {}",
                raw_body.len()
            )));
        }
        BodyFraming::Length(len) => raw_body[..len].to_vec(),
        BodyFraming::Chunked => dechunk(raw_body)?,
        BodyFraming::UntilClose => raw_body.to_vec(),
    };
    let body = decode_content(&head.headers, body)?;

    Ok(Response {
        status: head.status,
        reason: head.reason,
        headers: head.headers,
        body,
    })
}

fn parse_head(bytes: &[u8]) -> Result<Option<ResponseHead>, RequestError> {
    let Some(end) = bytes
        .windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
    else {
        return Ok(None);
    };
    let head = String::from_utf8_lossy(&bytes[..end]);
    let mut lines = head.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| RequestError::InvalidResponse("missing status line".to_string()))?;
    let mut status_parts = status_line.splitn(3, ' ');
    let version = status_parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(RequestError::InvalidResponse(format!(
            "unexpected status line `{status_line}`"
        )));
    }
    let status = status_parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| RequestError::InvalidResponse(format!("invalid status in `{status_line}`")))?;
    let reason = status_parts.next().unwrap_or_default().trim().to_string();

    let mut headers = HeaderMap::new();
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| RequestError::InvalidResponse(format!("invalid header name `{name}`")))?;
        let value = HeaderValue::from_bytes(value.trim().as_bytes())
            .map_err(|_| RequestError::InvalidResponse("invalid header value".to_string()))?;
        headers.append(name, value);
    }

    Ok(Some(ResponseHead {
        status,
        reason,
        headers,
        body_start: end + HEAD_TERMINATOR.len(),
    }))
}

fn framing(head: &ResponseHead, head_only: bool) -> BodyFraming {
    if head_only || (100..200).contains(&head.status) || head.status == 204 || head.status == 304 {
        return BodyFraming::Empty;
    }
    let chunked = head
        .headers
        .get_all(TRANSFER_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.to_ascii_lowercase().contains("chunked"));
    if chunked {
        return BodyFraming::Chunked;
    }
    match head
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<usize>().ok())
    {
        Some(len) => BodyFraming::Length(len),
        None => BodyFraming::UntilClose,
    }
}

fn dechunk(mut bytes: &[u8]) -> Result<Vec<u8>, RequestError> {
    let mut body = Vec::new();
    loop {
        let line_end = bytes
            .windows(2)
            .position(|window| window == b"\r\n")
            .ok_or_else(|| RequestError::InvalidResponse("truncated chunk size".to_string()))?;
        let size_line = String::from_utf8_lossy(&bytes[..line_end]);
        let size_text = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_text, 16).map_err(|_| {
            RequestError::InvalidResponse(format!("invalid chunk size `{size_text}`"))
        })?;
        bytes = &bytes[line_end + 2..];
        if size == 0 {
            return Ok(body);
        }
        let framed = size
            .checked_add(2)
            .ok_or_else(|| RequestError::InvalidResponse("chunk size too large".to_string()))?;
        if bytes.len() < framed {
            return Err(RequestError::InvalidResponse("truncated chunk".to_string()));
        }
        body.extend_from_slice(&bytes[..size]);
        bytes = &bytes[framed..];
    }
}

fn decode_content(headers: &HeaderMap, body: Vec<u8>) -> Result<Vec<u8>, RequestError> {
    if body.is_empty() {
        return Ok(body);
    }
    let encoding = headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();
    let mut decoded = Vec::new();
    let result = match encoding.as_str() {
        "gzip" | "x-gzip" => GzDecoder::new(body.as_slice()).read_to_end(&mut decoded),
        "deflate" => {
            let zlib = ZlibDecoder::new(body.as_slice()).read_to_end(&mut decoded);
            if zlib.is_err() {
                decoded.clear();
                DeflateDecoder::new(body.as_slice()).read_to_end(&mut decoded)
            } else {
                zlib
            }
        }
        _ => return Ok(body),
    };
    result
        .map(|_| decoded)
        .map_err(|err| RequestError::InvalidResponse(format!("{encoding} decoding failed: {err}")))
}
