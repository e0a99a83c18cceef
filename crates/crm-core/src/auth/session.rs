//! The process's single authoritative credential.
//!
//! `SessionStore` is a cheap, cloneable handle. Every clone shares the same
//! state, so the gateway, the domain client, and the front-end all observe
//! the same session without any global.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::store::{MemoryTokenStore, TokenStore};
use crate::models::User;

/// Opaque bearer token. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Accepts any non-blank string without whitespace or control characters,
    /// which is what an `Authorization` header value can carry.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The credential header value, `Bearer <token>`.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

/// Who the current token belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    /// Full account record returned by a login in this process.
    User(User),
    /// Rehydrated from a persisted token; the account was not looked up.
    Restored,
}

impl Identity {
    pub fn username(&self) -> Option<&str> {
        match self {
            Identity::User(user) => Some(user.username.as_str()),
            Identity::Restored => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::User(user) => Some(user),
            Identity::Restored => None,
        }
    }
}

/// Token and identity, always present together.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub token: Token,
    pub identity: Identity,
}

/// Published on every session transition. See [`SessionStore::subscribe`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    SignedOut,
    SignedIn(Identity),
    /// The backend rejected the token; the session was cleared and the user
    /// must log in again.
    Expired,
}

struct Inner {
    state: RwLock<Option<SessionData>>,
    backend: Box<dyn TokenStore>,
    status: watch::Sender<SessionStatus>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(backend: impl TokenStore + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn TokenStore>) -> Self {
        let (status, _) = watch::channel(SessionStatus::SignedOut);
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(None),
                backend,
                status,
            }),
        }
    }

    /// A session that is never written to disk.
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    /// Hydrate from the persisted token, if there is one.
    ///
    /// The token is trusted as-is: nothing is sent to the backend, and the
    /// identity is `Restored` until the next login. Returns whether a session
    /// is now present.
    pub fn load(&self) -> bool {
        let token = match self.inner.backend.load() {
            Ok(Some(raw)) => Token::parse(raw),
            Ok(None) => None,
            Err(e) => {
                warn!(backend = self.inner.backend.kind(), error = %e, "Failed to read persisted token");
                None
            }
        };

        let mut state = self.write();
        if state.is_some() {
            return true;
        }
        let Some(token) = token else {
            debug!(backend = self.inner.backend.kind(), "No persisted session token");
            return false;
        };

        *state = Some(SessionData {
            token,
            identity: Identity::Restored,
        });
        self.publish(SessionStatus::SignedIn(Identity::Restored));
        info!(backend = self.inner.backend.kind(), "Session restored from persisted token");
        true
    }

    /// Install a new session and persist its token.
    ///
    /// Readers see either the previous session or this one, never a mix.
    /// A persistence failure is logged; the in-memory session still applies.
    pub fn set(&self, token: Token, identity: Identity) {
        let mut state = self.write();
        if let Err(e) = self.inner.backend.save(token.as_str()) {
            warn!(backend = self.inner.backend.kind(), error = %e, "Failed to persist session token");
        }
        *state = Some(SessionData {
            token,
            identity: identity.clone(),
        });
        self.publish(SessionStatus::SignedIn(identity));
        debug!("Session set");
    }

    /// Drop the session and the persisted token. Idempotent and infallible.
    pub fn clear(&self) {
        let mut state = self.write();
        self.clear_locked(&mut state, SessionStatus::SignedOut);
    }

    /// Clear the session only if it still holds `token`.
    ///
    /// Used when the backend rejects a credential: a rejection of an older
    /// token must not wipe a session established after the request was sent.
    pub fn clear_if_current(&self, token: &Token) -> bool {
        let mut state = self.write();
        match state.as_ref() {
            Some(current) if current.token == *token => {
                self.clear_locked(&mut state, SessionStatus::Expired);
                true
            }
            _ => false,
        }
    }

    pub fn token(&self) -> Option<Token> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.read().as_ref().map(|s| s.identity.clone())
    }

    pub fn snapshot(&self) -> Option<SessionData> {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Watch session transitions, including server-side expiry.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.status.borrow().clone()
    }

    /// Name of the persistence backend ("file", "keyring", "memory").
    pub fn storage_kind(&self) -> &'static str {
        self.inner.backend.kind()
    }

    fn clear_locked(&self, state: &mut Option<SessionData>, status: SessionStatus) {
        let had_session = state.take().is_some();
        if let Err(e) = self.inner.backend.delete() {
            warn!(backend = self.inner.backend.kind(), error = %e, "Failed to remove persisted token");
        }
        if had_session {
            self.publish(status);
            debug!("Session cleared");
        }
    }

    fn publish(&self, status: SessionStatus) {
        self.inner.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<SessionData>> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<SessionData>> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.read())
            .field("backend", &self.inner.backend.kind())
            .finish()
    }
}
