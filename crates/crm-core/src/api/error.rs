use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthenticated - token missing, expired or invalid")]
    Unauthenticated { message: Option<String> },

    #[error("Access denied: {body}")]
    AccessDenied { message: Option<String>, body: String },

    #[error("Resource not found: {body}")]
    NotFound { message: Option<String>, body: String },

    #[error("Request rejected ({status}): {body}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
        body: String,
    },

    #[error("Server error ({status}): {body}")]
    ServerError {
        status: StatusCode,
        message: Option<String>,
        body: String,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error bodies use `message`, except the generic 404/500 handlers which use
/// `error`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    fn extract_message(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed
            .message
            .or(parsed.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        let body = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthenticated { message },
            403 => ApiError::AccessDenied { message, body },
            404 => ApiError::NotFound { message, body },
            500..=599 => ApiError::ServerError {
                status,
                message,
                body,
            },
            _ => ApiError::Rejected {
                status,
                message,
                body,
            },
        }
    }

    /// The message the backend put in the error body, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthenticated { message }
            | ApiError::AccessDenied { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Rejected { message, .. }
            | ApiError::ServerError { message, .. } => message.as_deref(),
            ApiError::NetworkError(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthenticated { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::AccessDenied { .. } => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::Rejected { status, .. } | ApiError::ServerError { status, .. } => Some(*status),
            ApiError::NetworkError(e) => e.status(),
            ApiError::InvalidResponse(_) => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated { .. })
    }

    /// Short line suitable for a transient notice: the server's message when
    /// there is one, otherwise `fallback`.
    pub fn notice(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// Failure result of `login` and `register`.
///
/// `error()` is always displayable: either what the server said or a fixed
/// fallback when the server said nothing usable.
#[derive(Error, Debug)]
pub enum AuthFailure {
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("{fallback}")]
    Failed {
        fallback: &'static str,
        #[source]
        source: ApiError,
    },
}

impl AuthFailure {
    pub(crate) fn from_api(source: ApiError, fallback: &'static str) -> Self {
        match source.server_message().map(str::to_owned) {
            Some(message) => AuthFailure::Rejected { message, source },
            None => AuthFailure::Failed { fallback, source },
        }
    }

    pub fn error(&self) -> &str {
        match self {
            AuthFailure::Rejected { message, .. } => message,
            AuthFailure::Failed { fallback, .. } => fallback,
        }
    }

    pub fn has_server_message(&self) -> bool {
        matches!(self, AuthFailure::Rejected { .. })
    }

    pub fn api_error(&self) -> &ApiError {
        match self {
            AuthFailure::Rejected { source, .. } | AuthFailure::Failed { source, .. } => source,
        }
    }
}
