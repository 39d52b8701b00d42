//! Method/path dispatch for the HTTP API.

use crate::server::api::{self, ApiError};

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn ok_json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(method: &str, path: &str, body: &str) -> HttpResponse {
    match (method, path) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/plain; charset=utf-8",
            body: usage_text(),
        },
        ("GET", "/api/health") => HttpResponse::ok_json(api::health_payload()),
        ("GET", "/api/table") => json_result(api::table_payload()),
        ("POST", "/api/open") => json_result(api::open_payload(body)),
        ("POST", "/api/until") => json_result(api::until_payload(body)),
        ("POST", "/api/batch") => json_result(api::batch_payload(body)),
        _ => error_response(404, "Not Found", &format!("no route for {method} {path}")),
    }
}

fn json_result(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::ok_json(payload),
        Err(err @ (ApiError::Parse(_) | ApiError::Validation(_))) => {
            error_response(400, "Bad Request", &err.to_string())
        }
        Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body,
    }
}

fn usage_text() -> String {
    [
        "pandora lootbox simulator",
        "",
        "GET  /api/health          engine status",
        "GET  /api/table           reference loot table",
        "POST /api/open            {\"amount\": n, \"seed\": n?}",
        "POST /api/until           {\"target\": \"all|1|2|3\"?, \"seed\": n?}",
        "POST /api/batch           {\"iterations\": n?, \"target\": ...?, \"seed\": n?, \"workers\": n?}",
        "",
    ]
    .join("\n")
}
