//! Authentication state for the CRM client.
//!
//! This module provides:
//! - `SessionStore`: the shared, process-wide session handle
//! - `TokenStore`: persistence for the session token, backed by a file
//!   (`FileTokenStore`), the OS keychain (`KeyringTokenStore`), or memory
//!   (`MemoryTokenStore`)
//!
//! Only the token is persisted. After a restart the identity is `Restored`
//! until the next login.

pub mod keychain;
pub mod session;
pub mod store;

pub use keychain::KeyringTokenStore;
pub use session::{Identity, SessionData, SessionStatus, SessionStore, Token};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
