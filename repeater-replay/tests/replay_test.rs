use std::sync::Mutex;

use assert_matches::assert_matches;
use repeater_codec::DecodeOptions;
use repeater_core::Headers;
use repeater_replay::{
    ExecuteRequest, ExecuteResponse, FailureKind, ReplayError, ReplayRequest, ReplayService,
    Transport, TransportError,
};

struct StubTransport {
    outcome: Result<ExecuteResponse, TransportError>,
    seen: Mutex<Vec<ExecuteRequest>>,
}

impl StubTransport {
    fn responding(status: u16, content_type: &str, body: &[u8]) -> Self {
        let headers: Headers = vec![("Content-Type", content_type)].into_iter().collect();
        Self {
            outcome: Ok(ExecuteResponse {
                status,
                status_text: "Stub".to_string(),
                headers,
                body: body.to_vec(),
                final_url: String::new(),
            }),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(kind: FailureKind, message: &str) -> Self {
        Self {
            outcome: Err(TransportError::new(kind, message)),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> ExecuteRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

impl Transport for StubTransport {
    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        self.outcome.clone()
    }
}

fn get(url: &str) -> ReplayRequest {
    ReplayRequest {
        method: "GET".to_string(),
        url: url.to_string(),
        headers: Headers::new(),
        body: None,
    }
}

#[tokio::test]
async fn error_status_is_a_normal_response() {
    let service = ReplayService::new(StubTransport::responding(404, "text/plain", b"missing"));
    let response = service.replay(get("https://x.test/y")).await.unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.body_text, "missing");
    assert_eq!(response.size_bytes, 7);
    assert!(response.duration_ms >= 0.0);
}

#[tokio::test]
async fn json_body_is_pretty_printed() {
    let service = ReplayService::new(StubTransport::responding(200, "application/json", br#"{"a":[1]}"#));
    let response = service.replay(get("https://x.test/")).await.unwrap();
    assert_eq!(response.body_text, "{\n  \"a\": [\n    1\n  ]\n}");
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn malformed_json_falls_back_to_text() {
    let service = ReplayService::new(StubTransport::responding(200, "application/json", b"{oops"));
    let response = service.replay(get("https://x.test/")).await.unwrap();
    assert_eq!(response.body_text, "{oops");
}

#[tokio::test]
async fn binary_body_is_a_placeholder() {
    let service = ReplayService::new(StubTransport::responding(200, "image/png", &[0x89, 0x50, 0x4e, 0x47]));
    let response = service.replay(get("https://x.test/logo.png")).await.unwrap();
    assert_eq!(response.body_text, "[binary data: 4 bytes, image/png]");
}

#[tokio::test]
async fn body_dropped_for_get_and_head() {
    let service = ReplayService::new(StubTransport::responding(200, "text/plain", b""));
    for method in ["GET", "head"] {
        let request = ReplayRequest {
            method: method.to_string(),
            body: Some("ignored".to_string()),
            ..get("https://x.test/")
        };
        service.replay(request).await.unwrap();
        assert_eq!(service.transport().last().body, None);
    }

    let request = ReplayRequest {
        method: "post".to_string(),
        body: Some("a=1".to_string()),
        ..get("https://x.test/")
    };
    service.replay(request).await.unwrap();
    let sent = service.transport().last();
    assert_eq!(sent.method, "POST");
    assert_eq!(sent.body, Some(b"a=1".to_vec()));
}

#[tokio::test]
async fn credentials_can_be_excluded() {
    let service = ReplayService::new(StubTransport::responding(200, "text/plain", b"")).with_credentials(false);
    let request = ReplayRequest {
        headers: vec![("Cookie", "s=1"), ("Authorization", "Bearer t"), ("Accept", "*/*")]
            .into_iter()
            .collect(),
        ..get("https://x.test/")
    };
    service.replay(request).await.unwrap();

    let sent = service.transport().last();
    assert!(!sent.headers.contains("cookie"));
    assert!(!sent.headers.contains("authorization"));
    assert_eq!(sent.headers.get("accept"), Some("*/*"));
}

#[tokio::test]
async fn transport_failure_is_classified() {
    let service = ReplayService::new(StubTransport::failing(FailureKind::Network, "connection refused"));
    let err = service.replay(get("https://x.test/")).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Network);
    assert_matches!(err, ReplayError::Transport { message, .. } if message == "connection refused");
}

#[tokio::test]
async fn invalid_url_never_reaches_transport() {
    let service = ReplayService::new(StubTransport::responding(200, "text/plain", b""));
    let err = service.replay(get("/relative")).await.unwrap_err();
    assert_matches!(err, ReplayError::InvalidRequest(_));
    assert!(service.transport().seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn replay_raw_uses_given_scheme() {
    let service = ReplayService::new(StubTransport::responding(200, "text/plain", b"ok"));
    let raw = "GET /path?q=1 HTTP/1.1\nHost: example.com\n\n";

    service.replay_raw(raw, &DecodeOptions::with_scheme("https")).await.unwrap();
    assert_eq!(service.transport().last().url, "https://example.com/path?q=1");

    service.replay_raw(raw, &DecodeOptions::default()).await.unwrap();
    assert_eq!(service.transport().last().url, "http://example.com/path?q=1");
}

#[tokio::test]
async fn replay_raw_surfaces_decode_errors() {
    let service = ReplayService::new(StubTransport::responding(200, "text/plain", b""));
    let err = service
        .replay_raw("GET /path HTTP/1.1\n\n", &DecodeOptions::default())
        .await
        .unwrap_err();
    assert_matches!(err, ReplayError::Codec(_));
    assert_eq!(err.kind(), FailureKind::InvalidRequest);
}
