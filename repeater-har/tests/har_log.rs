use repeater_har::{normalize_entry, parse_log};

const LOG: &str = r#"{
  "log": {
    "version": "1.2",
    "creator": { "name": "browser", "version": "1" },
    "entries": [
      {
        "startedDateTime": "2024-05-01T10:00:00Z",
        "request": { "method": "GET", "url": "https://a.com/1", "headers": [] },
        "response": { "status": 200, "statusText": "OK", "headers": [], "content": { "size": 0 } },
        "timings": { "send": 1, "wait": 2, "receive": 3 }
      },
      {
        "request": { "method": "GET", "url": "https://b.com/1", "headers": [] }
      },
      {
        "startedDateTime": "2024-05-01T10:00:01Z",
        "request": { "method": "DELETE", "url": "https://a.com/2", "headers": [] },
        "response": { "status": 404, "statusText": "Not Found", "headers": [], "content": { "size": -1 } }
      }
    ]
  }
}"#;

#[test]
fn malformed_entries_do_not_stop_the_rest() {
    let entries = parse_log(LOG).unwrap();
    assert_eq!(entries.len(), 3);

    let normalized: Vec<_> = entries.iter().filter_map(|entry| normalize_entry(entry).ok()).collect();
    assert_eq!(normalized.len(), 2);
    assert_eq!(normalized[0].response().unwrap().duration_ms, 6.0);
    assert_eq!(normalized[1].method, "DELETE");
    assert_eq!(normalized[1].response().unwrap().status, 404);
    assert_eq!(normalized[1].response().unwrap().size_bytes, 0);
}

#[test]
fn log_without_entries_is_empty() {
    assert!(parse_log(r#"{"log":{}}"#).unwrap().is_empty());
}
