//! Persistence backends for the session token.
//!
//! A backend only ever holds one opaque token string under a fixed key.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::warn;

/// Token file name inside the data directory
const TOKEN_FILE: &str = "token";

#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("token file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("keyring service '{service}' did not keep the token; no persistent keychain on this platform")]
    NotRetained { service: String },
}

pub trait TokenStore: Send + Sync {
    /// Read the persisted token. Absent and blank both mean `None`.
    fn load(&self) -> Result<Option<String>, TokenStoreError>;

    fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove the persisted token. Removing a missing token is not an error.
    fn delete(&self) -> Result<(), TokenStoreError>;

    /// Short backend name for status output.
    fn kind(&self) -> &'static str;
}

/// Stores the token in a single file, readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(TOKEN_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let token = contents.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    warn!(path = %parent.display(), error = %e, "Failed to restrict data directory permissions");
                }
            }
        }
        fs::write(&self.path, token).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn delete(&self) -> Result<(), TokenStoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}

/// Keeps the token for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as if a previous run had saved it.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.clone().filter(|t| !t.trim().is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<(), TokenStoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_save_load_delete_cycle() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::new(tmp.path().join("nested"));

        assert_eq!(store.load().expect("load"), None);

        store.save("abc.def.ghi").expect("save");
        assert_eq!(store.load().expect("load").as_deref(), Some("abc.def.ghi"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(store.path()).expect("metadata").permissions().mode() & 0o777;
            assert_eq!(mode, 0o600, "token file should be 0600");
        }

        store.delete().expect("delete");
        assert!(!store.path().exists());
        // Deleting twice is fine
        store.delete().expect("second delete");
    }

    #[test]
    fn test_file_store_ignores_blank_content() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::new(tmp.path());
        fs::write(store.path(), "   \n  ").expect("write");
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn test_file_store_trims_trailing_newline() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::new(tmp.path());
        fs::write(store.path(), "tok\n").expect("write");
        assert_eq!(store.load().expect("load").as_deref(), Some("tok"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("T");
        assert_eq!(store.load().unwrap().as_deref(), Some("T"));
        store.delete().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.save("U").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("U"));
        assert_eq!(store.kind(), "memory");
    }
}
