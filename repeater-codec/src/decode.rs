use repeater_core::{Headers, Request, UrlParts};

use crate::CodecError;

const DEFAULT_SCHEME: &str = "http";

/// Scheme used when a relative request target is resolved against `Host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    pub scheme: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
        }
    }
}

impl DecodeOptions {
    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    /// Keeps the scheme of the request being edited.
    pub fn for_request(request: &Request) -> Self {
        Self::with_scheme(request.url_parts().scheme.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFields {
    pub method: String,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

impl RequestFields {
    pub fn into_request(self) -> Result<Request, CodecError> {
        let request = Request::new(self.method, &self.url)
            .map_err(|err| CodecError::InvalidUrl(err.to_string()))?;
        let mime_type = self.headers.get("content-type").map(str::to_string);
        Ok(request
            .with_headers(self.headers)
            .with_body(self.body, mime_type))
    }
}

/// Parses raw request text. Nothing after the blank line decodes to `body: None`;
/// `encode` writes the same text for an empty body and for no body, so both
/// come back as `None`.
pub fn decode(text: &str, options: &DecodeOptions) -> Result<RequestFields, CodecError> {
    let mut segments = text.split_inclusive('\n');
    let mut offset = 0;

    let request_line = loop {
        let Some(segment) = segments.next() else {
            return Err(CodecError::EmptyRequest);
        };
        offset += segment.len();
        let line = trim_line_ending(segment);
        if !line.trim().is_empty() {
            break line;
        }
    };

    let tokens: Vec<&str> = request_line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(CodecError::InvalidRequestLine(request_line.trim().to_string()));
    }
    let method = tokens[0].to_ascii_uppercase();
    let target = tokens[1];

    let mut headers = Headers::new();
    let mut body = None;
    for segment in segments {
        offset += segment.len();
        let line = trim_line_ending(segment);
        if line.trim().is_empty() {
            body = Some(&text[offset..]).filter(|rest| !rest.is_empty());
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        headers.append(name, value.trim());
    }

    let url = resolve_target(target, &headers, options)?;
    Ok(RequestFields {
        method,
        url,
        headers,
        body: body.map(str::to_string),
    })
}

fn resolve_target(
    target: &str,
    headers: &Headers,
    options: &DecodeOptions,
) -> Result<String, CodecError> {
    if let Ok(url) = url::Url::parse(target) {
        if url.host_str().is_some_and(|host| !host.is_empty()) {
            return Ok(url.to_string());
        }
    }

    let host = headers
        .get("host")
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .ok_or(CodecError::HostRequired)?;
    let separator = if target.starts_with('/') { "" } else { "/" };
    let url = format!("{}://{}{}{}", options.scheme, host, separator, target);
    let (parsed, _) =
        UrlParts::parse(&url).map_err(|err| CodecError::InvalidUrl(err.to_string()))?;
    Ok(parsed.to_string())
}

fn trim_line_ending(segment: &str) -> &str {
    segment
        .strip_suffix('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .unwrap_or(segment)
}
