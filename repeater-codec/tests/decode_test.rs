use assert_matches::assert_matches;
use repeater_codec::{CodecError, DecodeOptions, decode};

#[test]
fn decodes_absolute_target() {
    let text = "post https://api.example.com/v1/login?x=1 HTTP/1.1\nContent-Type: application/json\n\n{\"user\":\"a\"}";
    let fields = decode(text, &DecodeOptions::default()).unwrap();

    assert_eq!(fields.method, "POST");
    assert_eq!(fields.url, "https://api.example.com/v1/login?x=1");
    assert_eq!(fields.headers.get("content-type"), Some("application/json"));
    assert_eq!(fields.body.as_deref(), Some("{\"user\":\"a\"}"));
}

#[test]
fn single_token_request_line_is_rejected() {
    let err = decode("GET\nHost: example.com\n\n", &DecodeOptions::default()).unwrap_err();
    assert_matches!(err, CodecError::InvalidRequestLine(_));
}

#[test]
fn blank_text_is_rejected() {
    let err = decode("\n  \n", &DecodeOptions::default()).unwrap_err();
    assert_matches!(err, CodecError::EmptyRequest);
}

#[test]
fn relative_target_without_host_is_rejected() {
    let err = decode("GET /path HTTP/1.1\nAccept: */*\n\n", &DecodeOptions::default()).unwrap_err();
    assert_matches!(err, CodecError::HostRequired);
    assert_eq!(err.to_string(), "URL must be absolute or Host header required");
}

#[test]
fn relative_target_resolves_against_host_with_default_scheme() {
    let fields = decode("GET /a?b=c HTTP/1.1\nhost: example.com:8080\n\n", &DecodeOptions::default()).unwrap();
    assert_eq!(fields.url, "http://example.com:8080/a?b=c");
}

#[test]
fn relative_target_resolves_with_secure_scheme() {
    let options = DecodeOptions::with_scheme("https");
    let fields = decode("GET /a HTTP/1.1\nHost: example.com\n\n", &options).unwrap();
    assert_eq!(fields.url, "https://example.com/a");
}

#[test]
fn scheme_follows_the_edited_request() {
    let original = repeater_core::Request::new("GET", "https://secure.example.com/old").unwrap();
    let options = DecodeOptions::for_request(&original);
    let fields = decode("GET /new HTTP/1.1\nHost: secure.example.com\n\n", &options).unwrap();
    assert_eq!(fields.url, "https://secure.example.com/new");
}

#[test]
fn skips_leading_blank_lines_and_colonless_headers() {
    let text = "\n\nGET / HTTP/1.1\nHost: example.com\nnot a header\nX-Trace :  abc:def  \n\n";
    let fields = decode(text, &DecodeOptions::default()).unwrap();

    assert_eq!(fields.headers.len(), 2);
    assert_eq!(fields.headers.get("x-trace"), Some("abc:def"));
    assert_eq!(fields.body, None);
}

#[test]
fn body_keeps_embedded_blank_lines_and_crlf() {
    let text = "POST / HTTP/1.1\r\nHost: example.com\r\n\r\nline one\r\n\r\nline three\r\n";
    let fields = decode(text, &DecodeOptions::default()).unwrap();

    assert_eq!(fields.headers.get("host"), Some("example.com"));
    assert_eq!(fields.body.as_deref(), Some("line one\r\n\r\nline three\r\n"));
}

#[test]
fn duplicate_headers_are_kept() {
    let text = "GET / HTTP/1.1\nHost: example.com\nCookie: a=1\nCookie: b=2\n\n";
    let fields = decode(text, &DecodeOptions::default()).unwrap();
    assert_eq!(fields.headers.get_all("cookie"), vec!["a=1", "b=2"]);
}

#[test]
fn fields_convert_into_request() {
    let text = "PUT /items/1 HTTP/1.1\nHost: example.com\nContent-Type: text/plain\n\nhello";
    let request = decode(text, &DecodeOptions::default())
        .unwrap()
        .into_request()
        .unwrap();

    assert_eq!(request.method, "PUT");
    assert_eq!(request.hostname(), "example.com");
    assert_eq!(request.body_mime_type.as_deref(), Some("text/plain"));
    assert_eq!(request.body_text.as_deref(), Some("hello"));
}
