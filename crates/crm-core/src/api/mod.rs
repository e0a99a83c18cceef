//! REST API client module for the CRM backend.
//!
//! This module provides:
//! - `ApiClient`: the authorized request gateway (login, register, logout,
//!   and bearer-token injection for every other call)
//! - `CrmClient`: typed list/create/update/delete methods per resource
//!
//! The backend issues JWT bearer tokens from `POST /auth/login`.

pub mod client;
pub mod crm;
pub mod error;

pub use client::{
    ApiClient, Credentials, Registration, DEFAULT_REQUEST_TIMEOUT_SECS, MIN_PASSWORD_LEN,
};
pub use crm::CrmClient;
pub use error::{ApiError, AuthFailure};
pub use reqwest::StatusCode;
