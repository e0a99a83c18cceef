//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend URL, where the session token is kept, the request timeout and the
//! last used username.
//!
//! Configuration is stored at `~/.config/crm-client/config.json`. The
//! `CRM_API_URL` environment variable overrides the configured backend URL.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, CrmClient, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, SessionStore, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "crm-client";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when neither the environment nor the config names one
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Environment variable overriding the backend URL
pub const API_URL_ENV: &str = "CRM_API_URL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub token_storage: TokenStorage,
    pub request_timeout_secs: Option<u64>,
    pub last_username: Option<String>,
    pub log_to_file: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where the token file and log files live.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Backend URL: environment, then config file, then the default.
    pub fn api_url(&self) -> String {
        self.resolve_api_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_url(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_url.clone().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn token_store(&self) -> Result<Box<dyn TokenStore>> {
        Ok(match self.token_storage {
            TokenStorage::File => Box::new(FileTokenStore::new(self.data_dir()?)),
            TokenStorage::Keyring => Box::new(KeyringTokenStore::new()),
            TokenStorage::Memory => Box::new(MemoryTokenStore::new()),
        })
    }

    /// Build the session, hydrated from whatever token was persisted.
    pub fn session_store(&self) -> Result<SessionStore> {
        let session = SessionStore::from_boxed(self.token_store()?);
        session.load();
        Ok(session)
    }

    /// Wire session, gateway and domain client together for `api_url`.
    pub fn connect(&self, api_url: &str) -> Result<CrmClient> {
        let session = self.session_store()?;
        let api = ApiClient::new(api_url, self.request_timeout(), session)
            .context("Failed to build HTTP client")?;
        Ok(CrmClient::new(api))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.resolve_api_url(None), DEFAULT_API_URL);

        config.api_url = Some("http://crm.internal/api".into());
        assert_eq!(config.resolve_api_url(None), "http://crm.internal/api");
        assert_eq!(
            config.resolve_api_url(Some("http://env.example/api".into())),
            "http://env.example/api"
        );
        assert_eq!(config.resolve_api_url(Some("  ".into())), "http://crm.internal/api");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let config = Config::load_from(&tmp.path().join("config.json")).expect("load");
        assert_eq!(config.token_storage, TokenStorage::File);
        assert_eq!(config.request_timeout(), Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("crm").join("config.json");

        let config = Config {
            api_url: Some("http://localhost:8080/api".into()),
            token_storage: TokenStorage::Keyring,
            request_timeout_secs: Some(5),
            last_username: Some("ana".into()),
            log_to_file: true,
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.api_url.as_deref(), Some("http://localhost:8080/api"));
        assert_eq!(loaded.token_storage, TokenStorage::Keyring);
        assert_eq!(loaded.request_timeout(), Duration::from_secs(5));
        assert_eq!(loaded.last_username.as_deref(), Some("ana"));
        assert!(loaded.log_to_file);
    }

    #[test]
    fn test_partial_config_file() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"token_storage": "memory"}"#).expect("write");

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.token_storage, TokenStorage::Memory);
        assert!(config.api_url.is_none());
        assert!(!config.session_store().expect("session").is_authenticated());
    }
}
