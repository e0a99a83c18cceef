//! Authorized request gateway for the CRM REST API.
//!
//! `ApiClient` owns the HTTP connection pool and a handle to the shared
//! `SessionStore`. It performs the login and register exchanges and is the
//! only way the domain client reaches the network, so every resource call
//! picks up the current credential.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{Identity, SessionStore, Token};
use crate::models::validation::{require_email, require_text};
use crate::models::{StatusMessage, User, ValidationErrors};

use super::{ApiError, AuthFailure};

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";

const LOGIN_FALLBACK: &str = "Login failed";
const REGISTER_FALLBACK: &str = "Registration failed";

/// Shortest password the login and register forms accept.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        require_text(&mut errors, "username", &self.username, "Username is required");
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        require_text(&mut errors, "username", &self.username, "Username is required");
        require_email(&mut errors, "email", Some(&self.email));
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str) {
    if password.is_empty() {
        errors.push("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

/// Clone is cheap - reqwest::Client and SessionStore are both Arc-backed.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: SessionStore,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, timeout_secs = timeout.as_secs(), "API client created");
        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ===== Session Operations =====

    /// Exchange credentials for a token and install the new session.
    ///
    /// A rejected login leaves the current session untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, AuthFailure> {
        let response: LoginResponse = self
            .exchange(LOGIN_PATH, credentials)
            .await
            .map_err(|e| {
                warn!(username = %credentials.username, error = %e, "Login failed");
                AuthFailure::from_api(e, LOGIN_FALLBACK)
            })?;

        let Some(token) = Token::parse(response.token) else {
            warn!("Login response carried an unusable token");
            return Err(AuthFailure::from_api(
                ApiError::InvalidResponse("login response carried an empty token".into()),
                LOGIN_FALLBACK,
            ));
        };

        let identity = Identity::User(response.user);
        self.session.set(token, identity.clone());
        info!(username = ?identity.username(), "Login successful");
        Ok(identity)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, registration: &Registration) -> Result<StatusMessage, AuthFailure> {
        let status: StatusMessage = self
            .exchange(REGISTER_PATH, registration)
            .await
            .map_err(|e| {
                warn!(username = %registration.username, error = %e, "Registration failed");
                AuthFailure::from_api(e, REGISTER_FALLBACK)
            })?;
        info!(username = %registration.username, "Registration successful");
        Ok(status)
    }

    /// Forget the current session. Requests that are already in flight keep
    /// the credential they were sent with.
    pub fn logout(&self) {
        self.session.clear();
        info!("Logged out");
    }

    // ===== Transport =====

    /// Credential exchange: no bearer header, and a 401 here says nothing
    /// about the stored session.
    async fn exchange<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }
        Self::decode(path, &text)
    }

    /// Attach the credential header when a session is present.
    fn auth_headers(token: Option<&Token>) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let mut value = header::HeaderValue::from_str(&token.bearer())
                .map_err(|_| ApiError::InvalidResponse("session token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// The single send path for every authorized call.
    ///
    /// The token is read once, when the request is built. A 401 clears the
    /// session, but only if it still holds the token this request carried.
    async fn dispatch<F>(&self, method: Method, path: &str, build: F) -> Result<Response, ApiError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let token = self.session.token();
        let request = self
            .client
            .request(method.clone(), self.url(path))
            .headers(Self::auth_headers(token.as_ref())?);

        let response = build(request).send().await?;
        let status = response.status();
        debug!(%method, path, %status, authorized = token.is_some(), "Response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        if error.is_unauthenticated() {
            if let Some(ref sent) = token {
                if self.session.clear_if_current(sent) {
                    warn!(%method, path, "Credential rejected by server; session cleared");
                }
            }
        }
        Err(error)
    }

    fn decode<T: DeserializeOwned>(path: &str, text: &str) -> Result<T, ApiError> {
        serde_json::from_str(text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
        })
    }

    async fn read_json<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        Self::decode(path, &text)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.dispatch(Method::GET, path, |r| r).await?;
        Self::read_json(path, response).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(Method::POST, path, |r| r.json(body)).await?;
        Self::read_json(path, response).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(Method::PUT, path, |r| r.json(body)).await?;
        Self::read_json(path, response).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.dispatch(Method::DELETE, path, |r| r).await?;
        Self::read_json(path, response).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}
