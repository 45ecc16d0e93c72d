use repeater_core::{Headers, Request, Response};

pub fn encode(request: &Request) -> String {
    let parts = request.url_parts();
    let mut raw = format!("{} {} HTTP/1.1\n", request.method, parts.path_and_query());
    if !request.headers.contains("host") {
        raw.push_str(&format!("Host: {}\n", parts.host));
    }
    push_headers(&mut raw, &request.headers);
    raw.push('\n');
    if let Some(body) = &request.body_text {
        raw.push_str(body);
    }
    raw
}

pub fn encode_response(response: &Response) -> String {
    let mut raw = format!("HTTP/1.1 {} {}\n", response.status, response.status_text);
    push_headers(&mut raw, &response.headers);
    raw.push('\n');
    raw.push_str(&response.body_text);
    raw
}

fn push_headers(raw: &mut String, headers: &Headers) {
    for header in headers.iter().filter(|header| !header.is_pseudo()) {
        raw.push_str(&header.name);
        raw.push_str(": ");
        raw.push_str(&header.value);
        raw.push('\n');
    }
}
