//! Session and credential behaviour of the request gateway, exercised
//! against a mock backend.

mod common;

use std::time::Duration;

use common::{contact_json, login_ok, MockBackend, Route};
use crm_core::auth::{FileTokenStore, MemoryTokenStore};
use crm_core::{
    ApiClient, ApiError, Credentials, Identity, Registration, SessionStatus, SessionStore, Token,
};
use serde_json::json;

fn token(raw: &str) -> Token {
    Token::parse(raw).expect("token")
}

fn contacts_ok() -> Route {
    Route::json("GET", "/contacts", 200, json!([contact_json(1, "Ada", "Lovelace")]))
}

#[tokio::test]
async fn login_stores_token_and_next_call_carries_it() {
    let backend = MockBackend::start(vec![login_ok("T", "a"), contacts_ok()]);
    let session = SessionStore::in_memory();
    let crm = backend.crm(session.clone());

    let identity = crm
        .api()
        .login(&Credentials::new("a", "b"))
        .await
        .expect("login succeeds");

    assert_eq!(identity.username(), Some("a"));
    assert_eq!(session.token(), Some(token("T")));
    assert_eq!(session.status(), SessionStatus::SignedIn(identity));

    let login = backend.last_request_to("POST", "/auth/login");
    assert_eq!(login.json(), json!({"username": "a", "password": "b"}));
    assert_eq!(login.authorization, None);

    crm.list_contacts().await.expect("contacts");
    let call = backend.last_request_to("GET", "/contacts");
    assert_eq!(call.authorization.as_deref(), Some("Bearer T"));
}

#[tokio::test]
async fn rejected_login_reports_server_message_and_leaves_session_empty() {
    let backend = MockBackend::start(vec![Route::json(
        "POST",
        "/auth/login",
        401,
        json!({"message": "bad credentials"}),
    )]);
    let session = SessionStore::in_memory();
    let api = backend.api(session.clone());

    let failure = api
        .login(&Credentials::new("a", "wrong"))
        .await
        .expect_err("login must fail");

    assert_eq!(failure.error(), "bad credentials");
    assert!(failure.has_server_message());
    assert!(failure.api_error().is_unauthenticated());
    assert!(!session.is_authenticated());
    assert_eq!(session.status(), SessionStatus::SignedOut);
}

#[tokio::test]
async fn rejected_login_does_not_touch_existing_session() {
    let backend = MockBackend::start(vec![Route::json(
        "POST",
        "/auth/login",
        401,
        json!({"message": "Invalid credentials"}),
    )]);
    let session = SessionStore::in_memory();
    session.set(token("existing"), Identity::Restored);
    let api = backend.api(session.clone());

    let failure = api.login(&Credentials::new("a", "b")).await.expect_err("fails");
    assert_eq!(failure.error(), "Invalid credentials");
    assert_eq!(session.token(), Some(token("existing")));
}

#[tokio::test]
async fn login_without_server_message_uses_fallback() {
    let backend = MockBackend::start(vec![Route::raw(
        "POST",
        "/auth/login",
        500,
        "<html>Internal Server Error</html>",
    )]);
    let session = SessionStore::in_memory();

    let failure = backend
        .api(session.clone())
        .login(&Credentials::new("a", "b"))
        .await
        .expect_err("fails");

    assert_eq!(failure.error(), "Login failed");
    assert!(!failure.has_server_message());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn login_with_blank_token_is_a_failure() {
    let backend = MockBackend::start(vec![login_ok("  ", "a")]);
    let session = SessionStore::in_memory();

    let failure = backend
        .api(session.clone())
        .login(&Credentials::new("a", "b"))
        .await
        .expect_err("blank token rejected");

    assert_eq!(failure.error(), "Login failed");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn unreachable_backend_is_a_failure_result() {
    let session = SessionStore::in_memory();
    let api = ApiClient::new("http://127.0.0.1:1/api", Duration::from_secs(2), session.clone())
        .expect("client");

    let failure = api.login(&Credentials::new("a", "b")).await.expect_err("no backend");
    assert_eq!(failure.error(), "Login failed");
    assert!(matches!(failure.api_error(), ApiError::NetworkError(_)));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn register_reports_outcome_without_logging_in() {
    let backend = MockBackend::start(vec![Route::json(
        "POST",
        "/auth/register",
        201,
        json!({"message": "User created successfully"}),
    )]);
    let session = SessionStore::in_memory();
    let api = backend.api(session.clone());

    let status = api
        .register(&Registration::new("ana", "ana@example.com", "pw"))
        .await
        .expect("registered");

    assert_eq!(status.message.as_deref(), Some("User created successfully"));
    assert!(!session.is_authenticated());
    assert_eq!(
        backend.last_request_to("POST", "/auth/register").json(),
        json!({"username": "ana", "email": "ana@example.com", "password": "pw"})
    );
}

#[tokio::test]
async fn register_failure_carries_server_message() {
    let backend = MockBackend::start(vec![Route::json(
        "POST",
        "/auth/register",
        400,
        json!({"message": "Username already exists"}),
    )]);
    let api = backend.api(SessionStore::in_memory());

    let failure = api
        .register(&Registration::new("ana", "ana@example.com", "pw"))
        .await
        .expect_err("duplicate");
    assert_eq!(failure.error(), "Username already exists");

    let backend = MockBackend::start(vec![Route::raw("POST", "/auth/register", 502, "")]);
    let failure = backend
        .api(SessionStore::in_memory())
        .register(&Registration::new("ana", "ana@example.com", "pw"))
        .await
        .expect_err("gateway error");
    assert_eq!(failure.error(), "Registration failed");
}

#[tokio::test]
async fn calls_without_session_carry_no_header() {
    let backend = MockBackend::start(vec![contacts_ok()]);
    let crm = backend.crm(SessionStore::in_memory());

    crm.list_contacts().await.expect("contacts");
    assert_eq!(backend.last_request_to("GET", "/contacts").authorization, None);
}

#[tokio::test]
async fn logout_before_call_sends_it_unauthenticated() {
    let backend = MockBackend::start(vec![login_ok("T", "a"), contacts_ok()]);
    let session = SessionStore::in_memory();
    let crm = backend.crm(session.clone());

    crm.api().login(&Credentials::new("a", "b")).await.expect("login");
    crm.api().logout();
    assert!(!session.is_authenticated());
    assert_eq!(session.status(), SessionStatus::SignedOut);

    crm.list_contacts().await.expect("contacts");
    assert_eq!(backend.last_request_to("GET", "/contacts").authorization, None);
}

#[tokio::test]
async fn logout_on_empty_session_is_noop() {
    let api = ApiClient::new(
        "http://127.0.0.1:1/api",
        Duration::from_secs(1),
        SessionStore::in_memory(),
    )
    .expect("client");
    let rx = api.session().subscribe();

    api.logout();
    api.logout();

    assert!(!api.session().is_authenticated());
    assert!(!rx.has_changed().expect("sender alive"));
}

#[tokio::test]
async fn logout_does_not_strip_in_flight_request() {
    let backend = MockBackend::start(vec![contacts_ok().delayed(Duration::from_millis(300))]);
    let session = SessionStore::in_memory();
    session.set(token("T"), Identity::Restored);
    let crm = backend.crm(session.clone());

    let in_flight = tokio::spawn({
        let crm = crm.clone();
        async move { crm.list_contacts().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    crm.api().logout();

    let contacts = in_flight.await.expect("join").expect("in-flight call completes");
    assert_eq!(contacts.len(), 1);
    assert_eq!(
        backend.last_request_to("GET", "/contacts").authorization.as_deref(),
        Some("Bearer T")
    );
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn unauthenticated_response_clears_session_and_signals() {
    let backend = MockBackend::start(vec![Route::json(
        "GET",
        "/contacts",
        401,
        json!({"message": "Token is invalid"}),
    )]);
    let session = SessionStore::in_memory();
    session.set(token("stale"), Identity::Restored);
    let mut status = session.subscribe();
    status.borrow_and_update();
    let crm = backend.crm(session.clone());

    let err = crm.list_contacts().await.expect_err("rejected");

    assert!(err.is_unauthenticated());
    assert_eq!(err.server_message(), Some("Token is invalid"));
    assert!(!session.is_authenticated());
    assert!(status.has_changed().expect("sender alive"));
    assert_eq!(*status.borrow(), SessionStatus::Expired);
}

#[tokio::test]
async fn rejection_of_replaced_token_keeps_newer_session() {
    let backend = MockBackend::start(vec![Route::json(
        "GET",
        "/contacts",
        401,
        json!({"message": "Token is invalid"}),
    )
    .delayed(Duration::from_millis(300))]);
    let session = SessionStore::in_memory();
    session.set(token("old"), Identity::Restored);
    let crm = backend.crm(session.clone());

    let in_flight = tokio::spawn({
        let crm = crm.clone();
        async move { crm.list_contacts().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.set(token("new"), Identity::Restored);

    let err = in_flight.await.expect("join").expect_err("old token rejected");
    assert!(err.is_unauthenticated());
    assert_eq!(session.token(), Some(token("new")));
}

#[tokio::test]
async fn restored_session_is_used_without_contacting_backend() {
    let tmp = tempfile::TempDir::new().expect("tmp dir");
    {
        let first = SessionStore::new(FileTokenStore::new(tmp.path()));
        first.set(token("persisted"), Identity::Restored);
    }

    let backend = MockBackend::start(vec![contacts_ok()]);
    let session = SessionStore::new(FileTokenStore::new(tmp.path()));
    assert!(session.load());
    assert!(backend.requests().is_empty(), "loading must not call the backend");
    assert_eq!(session.identity(), Some(Identity::Restored));

    backend.crm(session).list_contacts().await.expect("contacts");
    assert_eq!(
        backend.last_request_to("GET", "/contacts").authorization.as_deref(),
        Some("Bearer persisted")
    );
}

#[tokio::test]
async fn health_check_goes_through_the_same_path() {
    let backend = MockBackend::start(vec![Route::json(
        "GET",
        "/health",
        200,
        json!({"status": "healthy", "timestamp": "2024-01-01T00:00:00"}),
    )]);
    let session = SessionStore::new(MemoryTokenStore::with_token("T"));
    session.load();
    let crm = backend.crm(session);

    let health = crm.health().await.expect("health");
    assert!(health.is_healthy());
    assert_eq!(
        backend.last_request_to("GET", "/health").authorization.as_deref(),
        Some("Bearer T")
    );
}
