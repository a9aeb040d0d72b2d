//! Bearer token persistence.
//!
//! At most one token is held at a time. Writers overwrite the slot fully;
//! there is no merge. No structure or expiry validation happens here: a stale
//! token is only discovered when the backend rejects it.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fixed key the token is stored under, in every backend.
pub const TOKEN_STORAGE_KEY: &str = "access_token";

/// Keychain service name
const KEYRING_SERVICE: &str = "gatehouse";

/// Single-slot store for the bearer token.
pub trait TokenStore: Send + Sync {
    /// Replace the stored token.
    fn save(&self, token: &str) -> Result<()>;

    /// The stored token, or `None` when absent or when no storage is available.
    fn read(&self) -> Option<String>;

    /// Remove the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("token slot poisoned"))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn read(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("token slot poisoned"))?;
        *slot = None;
        Ok(())
    }
}

// ============================================================================
// File
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub saved_at: DateTime<Utc>,
}

/// Token persisted as JSON in the data directory.
///
/// A store without a directory is detached: nothing is written and reads
/// return `None`. This is what you get when the platform has no data dir.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: Option<PathBuf>,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn detached() -> Self {
        Self { dir: None }
    }

    pub fn is_detached(&self) -> bool {
        self.dir.is_none()
    }

    fn token_path(&self) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", TOKEN_STORAGE_KEY)))
    }

    /// Load the full stored record, including when it was saved.
    pub fn load(&self) -> Option<StoredToken> {
        let path = self.token_path()?;
        if !path.exists() {
            return None;
        }
        match Self::read_record(&path) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable token file");
                None
            }
        }
    }

    fn read_record(path: &Path) -> Result<StoredToken> {
        let contents = std::fs::read_to_string(path).context("Failed to read token file")?;
        serde_json::from_str(&contents).context("Failed to parse token file")
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str) -> Result<()> {
        let Some(path) = self.token_path() else {
            debug!("No storage medium, token not persisted");
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create token directory")?;
        }
        let record = StoredToken {
            access_token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, contents).context("Failed to write token file")?;
        Ok(())
    }

    fn read(&self) -> Option<String> {
        self.load().map(|record| record.access_token)
    }

    fn clear(&self) -> Result<()> {
        if let Some(path) = self.token_path() {
            if path.exists() {
                std::fs::remove_file(&path).context("Failed to remove token file")?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// OS keychain
// ============================================================================

/// Token stored in the OS keychain under the fixed storage key.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, TOKEN_STORAGE_KEY).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn save(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn read(&self) -> Option<String> {
        let entry = match self.entry() {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Keychain unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(token) => Some(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read token from keychain");
                None
            }
        }
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
