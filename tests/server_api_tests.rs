//! Exercises the HTTP routing layer directly; no sockets involved. These
//! rely on the shipped data/loot_table.json like the server itself does.

use pandora::server::routes::route_request;
use serde_json::Value;

fn body_json(body: &str) -> Value {
    serde_json::from_str(body).expect("response body must be JSON")
}

#[test]
fn health_reports_engine_ok() {
    let response = route_request("GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    let payload = body_json(&response.body);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["engine"], "pandora");
}

#[test]
fn root_serves_usage_text() {
    let response = route_request("GET", "/", "");
    assert_eq!(response.status_code, 200);
    assert!(response.body.contains("/api/open"));
}

#[test]
fn unknown_route_is_404() {
    let response = route_request("GET", "/api/nothing", "");
    assert_eq!(response.status_code, 404);
    assert!(body_json(&response.body)["error"].is_string());
}

#[test]
fn table_endpoint_returns_the_reference_table() {
    let response = route_request("GET", "/api/table", "");
    assert_eq!(response.status_code, 200);
    let payload = body_json(&response.body);
    assert_eq!(payload["boxes"].as_array().map(Vec::len), Some(3));
}

#[test]
fn open_requires_valid_json() {
    let response = route_request("POST", "/api/open", "{ nope");
    assert_eq!(response.status_code, 400);
}

#[test]
fn open_rejects_zero_amount() {
    let response = route_request("POST", "/api/open", r#"{"amount": 0}"#);
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("at least 1"));
}

#[test]
fn open_runs_a_seeded_simulation() {
    let response = route_request("POST", "/api/open", r#"{"amount": 5, "seed": 11}"#);
    assert_eq!(response.status_code, 200, "body: {}", response.body);
    let payload = body_json(&response.body);
    assert_eq!(payload["amount"], 5);
    assert_eq!(payload["seed"], 11);
    // Nothing chains down to tier 1 in the sample table.
    assert_eq!(payload["opened"]["1"], 5);
    assert!(payload["rewards"].as_object().is_some_and(|map| !map.is_empty()));

    let again = route_request("POST", "/api/open", r#"{"amount": 5, "seed": 11}"#);
    assert_eq!(body_json(&again.body), payload);
}

#[test]
fn until_rejects_unknown_target() {
    let response = route_request("POST", "/api/until", r#"{"target": "everything"}"#);
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("unknown target"));
}

#[test]
fn until_returns_purchase_count() {
    let response = route_request("POST", "/api/until", r#"{"target": "1", "seed": 3}"#);
    assert_eq!(response.status_code, 200, "body: {}", response.body);
    let payload = body_json(&response.body);
    assert_eq!(payload["target"], "1");
    assert!(payload["purchased"].as_u64().unwrap() >= 1);
}

#[test]
fn batch_caps_iterations() {
    let response = route_request("POST", "/api/batch", r#"{"iterations": 9999999}"#);
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("exceeds the maximum"));
}

#[test]
fn batch_returns_min_max_average() {
    let response = route_request(
        "POST",
        "/api/batch",
        r#"{"iterations": 4, "target": "1", "seed": 21}"#,
    );
    assert_eq!(response.status_code, 200, "body: {}", response.body);
    let payload = body_json(&response.body);
    assert_eq!(payload["iterations"], 4);
    let min = payload["min"].as_u64().unwrap();
    let max = payload["max"].as_u64().unwrap();
    let average = payload["average"].as_f64().unwrap();
    assert!(min >= 1);
    assert!(min <= max);
    assert!(average >= min as f64 && average <= max as f64);
}

#[test]
fn http_serialization_includes_content_length() {
    let response = route_request("GET", "/api/health", "");
    let raw = response.to_http_string();
    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(raw.contains(&format!("Content-Length: {}", response.body.len())));
}
