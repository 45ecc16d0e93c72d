const TEXTUAL_MARKERS: [&str; 5] = ["xml", "javascript", "x-www-form-urlencoded", "graphql", "ecmascript"];

pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence == "application/json" || essence.ends_with("+json") || essence.ends_with("/json")
}

pub fn is_textual_content_type(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence.starts_with("text/") || TEXTUAL_MARKERS.iter().any(|marker| essence.contains(marker))
}

pub fn binary_placeholder(len: usize, content_type: Option<&str>) -> String {
    let content_type = content_type
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("application/octet-stream");
    format!("[binary data: {len} bytes, {content_type}]")
}

/// Turns a payload into the string kept on the model: pretty JSON, text, or a
/// placeholder describing a binary body.
pub fn materialize_body(content_type: Option<&str>, bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    let Some(content_type) = content_type.filter(|value| !value.trim().is_empty()) else {
        return match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => binary_placeholder(bytes.len(), None),
        };
    };
    if is_json_content_type(content_type) {
        return match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(value) => serde_json::to_string_pretty(&value)
                .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        };
    }
    if is_textual_content_type(content_type) {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    binary_placeholder(bytes.len(), Some(content_type))
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
