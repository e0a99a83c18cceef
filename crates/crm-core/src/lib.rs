//! Core library for the CRM client.
//!
//! The pieces fit together like this:
//!
//! - [`auth::SessionStore`] holds the one current credential and persists
//!   its token through a [`auth::TokenStore`].
//! - [`api::ApiClient`] logs in, registers and logs out, and attaches
//!   `Authorization: Bearer <token>` to every other request.
//! - [`api::CrmClient`] maps contacts, companies and deals onto REST calls.
//! - [`dashboard::DashboardStats`] aggregates the three lists.
//!
//! ```no_run
//! use std::time::Duration;
//! use crm_core::{ApiClient, Credentials, CrmClient, SessionStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SessionStore::in_memory();
//! let api = ApiClient::new("http://localhost:5000/api", Duration::from_secs(30), session)?;
//! api.login(&Credentials::new("ana", "secret")).await?;
//!
//! let crm = CrmClient::new(api);
//! let contacts = crm.list_contacts().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;

pub use api::{ApiClient, ApiError, AuthFailure, Credentials, CrmClient, Registration};
pub use auth::{Identity, SessionStatus, SessionStore, Token};
pub use config::Config;
pub use dashboard::DashboardStats;
