use std::collections::BTreeMap;
use std::fmt::Write;

use repeater_core::{Request, Response, format_size, status_class};
use repeater_storage::Settings;

pub fn summary_line(request: &Request) -> String {
    let status = match request.response() {
        Some(response) => format!(
            "{} {:<3}",
            response.status,
            status_class(response.status).unwrap_or("-")
        ),
        None => "--- -  ".to_string(),
    };
    let size = request
        .response()
        .map(|response| format_size(response.size_bytes))
        .unwrap_or_default();
    format!(
        "{}  {:<7} {}  {:>9}  {}",
        request.id(),
        request.method,
        status,
        size,
        request.url()
    )
}

pub fn grouped(groups: &BTreeMap<String, Vec<Request>>) -> String {
    let mut out = String::new();
    for (domain, requests) in groups {
        let _ = writeln!(out, "{domain} ({})", requests.len());
        for request in requests {
            let _ = writeln!(out, "  {}", summary_line(request));
        }
    }
    out
}

pub fn response_meta(response: &Response) -> String {
    format!(
        "# {} {} in {:.0} ms, {}",
        response.status,
        response.status_text,
        response.duration_ms,
        format_size(response.size_bytes)
    )
}

pub fn settings(settings: &Settings) -> String {
    format!(
        "theme = {}\nautoCapture = {}\nmaxRequests = {}",
        settings.theme.as_str(),
        settings.auto_capture,
        settings.max_requests
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use repeater_core::{Headers, Request, Response};

    use super::{grouped, summary_line};

    fn with_response(url: &str, status: u16, size_bytes: u64) -> Request {
        let mut request = Request::new("GET", url).unwrap();
        request.attach_response(Response {
            status,
            status_text: String::new(),
            headers: Headers::new(),
            body_text: String::new(),
            duration_ms: 3.0,
            size_bytes,
            content_type: None,
        });
        request
    }

    #[test]
    fn summary_shows_status_class_and_size() {
        let line = summary_line(&with_response("https://a.com/x", 404, 2048));
        assert!(line.contains("404 4xx"), "{line}");
        assert!(line.contains("2.0 KB"), "{line}");
        assert!(line.ends_with("https://a.com/x"), "{line}");
    }

    #[test]
    fn pending_response_has_placeholder_status() {
        let line = summary_line(&Request::new("POST", "https://a.com/").unwrap());
        assert!(line.contains("POST"));
        assert!(line.contains("---"));
    }

    #[test]
    fn grouped_lists_domain_counts() {
        let mut groups = BTreeMap::new();
        groups.insert(
            "a.com".to_string(),
            vec![with_response("https://a.com/1", 200, 1), with_response("https://a.com/2", 200, 1)],
        );
        let out = grouped(&groups);
        assert!(out.starts_with("a.com (2)\n"));
        assert_eq!(out.lines().count(), 3);
    }
}
