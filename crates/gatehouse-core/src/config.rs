//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which holds the
//! backend URL, the token storage backend and where the federated session
//! snapshot lives.
//!
//! Configuration is stored at `~/.config/gatehouse/config.json`. The backend
//! URL can be overridden with `GATEHOUSE_API_URL` (also read from `.env`).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{
    FederatedSessionProvider, FileFederatedProvider, FileTokenStore, KeyringTokenStore,
    MemoryTokenStore, StaticFederatedProvider, TokenStore,
};

/// Application name used for config/data directory paths
const APP_NAME: &str = "gatehouse";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default federated session snapshot file name in the data directory
const FEDERATED_SESSION_FILE: &str = "federated_session.json";

/// Environment variable overriding `api_url`
pub const API_URL_ENV: &str = "GATEHOUSE_API_URL";

/// Where the bearer token is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub token_backend: TokenBackend,
    pub federated_session_path: Option<PathBuf>,
    pub last_email: Option<String>,
}

impl Config {
    /// Load from the default location with environment overrides applied.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
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

    /// Data directory for the token file and session snapshot, if the platform has one.
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(APP_NAME))
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = Some(url.trim().to_string());
            }
        }
    }

    /// The backend base URL. Required for any network operation.
    pub fn api_url(&self) -> Result<&str> {
        self.api_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No backend URL configured. Set {} or api_url in {}",
                    API_URL_ENV,
                    CONFIG_FILE
                )
            })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Build the configured token store.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        match self.token_backend {
            TokenBackend::File => match Self::data_dir() {
                Some(dir) => Arc::new(FileTokenStore::new(dir)),
                None => Arc::new(FileTokenStore::detached()),
            },
            TokenBackend::Keyring => Arc::new(KeyringTokenStore::new()),
            TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
        }
    }

    /// Path of the federated session snapshot, if any can be determined.
    pub fn federated_session_path(&self) -> Option<PathBuf> {
        self.federated_session_path
            .clone()
            .or_else(|| Self::data_dir().map(|dir| dir.join(FEDERATED_SESSION_FILE)))
    }

    /// Build the federated session provider.
    pub fn federated_provider(&self) -> Arc<dyn FederatedSessionProvider> {
        match self.federated_session_path() {
            Some(path) => Arc::new(FileFederatedProvider::new(path)),
            None => Arc::new(StaticFederatedProvider::signed_out()),
        }
    }
}
