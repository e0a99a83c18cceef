use keyring::Entry;
use tracing::debug;

use super::store::{TokenStore, TokenStoreError};

const SERVICE_NAME: &str = "crm-client";
const ENTRY_NAME: &str = "session-token";

/// Stores the token in the OS keychain.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a different keychain service, e.g. to keep test runs away from
    /// real credentials.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry, TokenStoreError> {
        Ok(Entry::new(&self.service, ENTRY_NAME)?)
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match self.entry()?.get_password() {
            Ok(token) if token.trim().is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the token, then reads it back through a fresh entry. Platforms
    /// without a keychain backend accept the write and forget it.
    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        self.entry()?.set_password(token)?;
        match self.load()? {
            Some(stored) if stored == token => Ok(()),
            _ => Err(TokenStoreError::NotRetained {
                service: self.service.clone(),
            }),
        }
    }

    fn delete(&self) -> Result<(), TokenStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, "No keychain entry to delete");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn kind(&self) -> &'static str {
        "keyring"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_fails_when_backend_forgets() {
        // Each mock entry holds its own credential, like a target with no
        // platform keychain.
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let store = KeyringTokenStore::with_service("crm-client-test");

        let err = store.save("T").expect_err("token was not kept");
        assert!(matches!(err, TokenStoreError::NotRetained { ref service } if service == "crm-client-test"));
        assert_eq!(store.load().expect("load"), None);
        assert!(store.delete().is_ok());
        assert_eq!(store.kind(), "keyring");
    }
}
