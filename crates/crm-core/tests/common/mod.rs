//! In-process mock of the CRM backend for integration tests.
//!
//! A `tiny_http` server bound to `127.0.0.1:0` answers canned JSON per
//! `(method, path)` and records every request it sees, including the
//! `Authorization` header.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crm_core::{ApiClient, CrmClient, SessionStore};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    method: String,
    path: String,
    status: u16,
    body: String,
    delay: Option<Duration>,
}

impl Route {
    pub fn json(method: &str, path: &str, status: u16, body: Value) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn raw(method: &str, path: &str, status: u16, body: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    /// Hold the response back; the server thread handles one request at a time.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

pub struct MockBackend {
    server: Arc<tiny_http::Server>,
    handle: Option<JoinHandle<()>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    base_url: String,
}

impl MockBackend {
    pub fn start(routes: Vec<Route>) -> Self {
        let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").expect("bind mock backend"));
        let port = server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .expect("mock backend port");

        let routes: HashMap<(String, String), Route> = routes
            .into_iter()
            .map(|r| ((r.method.clone(), r.path.clone()), r))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            std::thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let method = request.method().to_string();
                    let url = request.url().to_string();
                    let path = url.strip_prefix("/api").unwrap_or(&url).to_string();
                    let authorization = request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string());
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);

                    requests.lock().unwrap().push(RecordedRequest {
                        method: method.clone(),
                        path: path.clone(),
                        authorization,
                        body,
                    });

                    let (status, body, delay) = match routes.get(&(method, path)) {
                        Some(route) => (route.status, route.body.clone(), route.delay),
                        None => (404, r#"{"error": "Not found"}"#.to_string(), None),
                    };
                    if let Some(delay) = delay {
                        std::thread::sleep(delay);
                    }

                    let response = tiny_http::Response::from_string(body)
                        .with_status_code(tiny_http::StatusCode(status))
                        .with_header(
                            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                                .expect("content-type header"),
                        );
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            server,
            handle: Some(handle),
            requests,
            base_url: format!("http://127.0.0.1:{}/api", port),
        }
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn last_request_to(&self, method: &str, path: &str) -> RecordedRequest {
        self.requests_to(method, path)
            .pop()
            .unwrap_or_else(|| panic!("no {} {} request recorded", method, path))
    }

    pub fn api(&self, session: SessionStore) -> ApiClient {
        ApiClient::new(self.url(), Duration::from_secs(5), session).expect("api client")
    }

    pub fn crm(&self, session: SessionStore) -> CrmClient {
        CrmClient::new(self.api(session))
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn login_ok(token: &str, username: &str) -> Route {
    Route::json(
        "POST",
        "/auth/login",
        200,
        serde_json::json!({
            "token": token,
            "user": {"id": 1, "username": username, "email": format!("{}@example.com", username)}
        }),
    )
}

pub fn contact_json(id: i64, first: &str, last: &str) -> Value {
    serde_json::json!({
        "id": id,
        "first_name": first,
        "last_name": last,
        "email": format!("{}@example.com", first.to_lowercase()),
        "phone": null,
        "company_id": null,
        "hubspot_id": null,
        "kommo_id": null,
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-01T00:00:00"
    })
}

pub fn company_json(id: i64, name: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "domain": null,
        "industry": null,
        "size": null,
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-01T00:00:00"
    })
}

pub fn deal_json(id: i64, name: &str, amount: f64, stage: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "amount": amount,
        "stage": stage,
        "probability": 50,
        "contact_id": null,
        "company_id": null,
        "close_date": null,
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-01T00:00:00"
    })
}
