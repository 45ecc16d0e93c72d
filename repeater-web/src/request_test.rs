use http::{HeaderValue, Uri, header};

use crate::Request;

#[test]
fn builds_request() {
    let uri: Uri = "http://example.com/".parse().unwrap();
    let request = Request::builder(uri.clone())
        .method(http::Method::POST)
        .body(b"hello".to_vec())
        .build();

    assert_eq!(request.uri, uri);
    assert_eq!(request.method, http::Method::POST);
    assert_eq!(request.body, b"hello".to_vec());
}

#[test]
fn header_appends_duplicates() {
    let uri: Uri = "http://example.com/".parse().unwrap();
    let request = Request::builder(uri)
        .header(header::COOKIE, HeaderValue::from_static("a=1"))
        .header(header::COOKIE, HeaderValue::from_static("b=2"))
        .build();

    assert_eq!(request.headers.get_all(header::COOKIE).iter().count(), 2);
}
