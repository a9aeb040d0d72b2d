//! Adapters for the federated (OAuth) session provider.
//!
//! The provider owns the session lifecycle. The resolver only reads a status
//! snapshot and asks the provider to sign out; it never touches provider
//! internals.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::models::{FederatedSession, FederatedStatus};

#[async_trait]
pub trait FederatedSessionProvider: Send + Sync {
    /// Current snapshot of the federated session.
    fn status(&self) -> FederatedStatus;

    /// End the federated session.
    async fn sign_out(&self) -> Result<()>;
}

/// Provider whose status is set directly by the embedding application.
#[derive(Debug)]
pub struct StaticFederatedProvider {
    status: Mutex<FederatedStatus>,
}

impl StaticFederatedProvider {
    pub fn new(status: FederatedStatus) -> Self {
        Self {
            status: Mutex::new(status),
        }
    }

    pub fn loading() -> Self {
        Self::new(FederatedStatus::Loading)
    }

    pub fn signed_in(session: FederatedSession) -> Self {
        Self::new(FederatedStatus::Authenticated(session))
    }

    pub fn signed_out() -> Self {
        Self::new(FederatedStatus::Unauthenticated)
    }

    pub fn set_status(&self, status: FederatedStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
    }
}

#[async_trait]
impl FederatedSessionProvider for StaticFederatedProvider {
    fn status(&self) -> FederatedStatus {
        self.status
            .lock()
            .map(|s| s.clone())
            .unwrap_or(FederatedStatus::Unauthenticated)
    }

    async fn sign_out(&self) -> Result<()> {
        self.set_status(FederatedStatus::Unauthenticated);
        Ok(())
    }
}

/// Provider backed by a session snapshot file written by an external OAuth helper.
///
/// A missing file means no federated session. An unreadable one is treated
/// the same way, with a warning.
#[derive(Debug, Clone)]
pub struct FileFederatedProvider {
    path: PathBuf,
}

impl FileFederatedProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<FederatedStatus> {
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read federated session file")?;
        serde_json::from_str(&contents).context("Failed to parse federated session file")
    }
}

#[async_trait]
impl FederatedSessionProvider for FileFederatedProvider {
    fn status(&self) -> FederatedStatus {
        if !self.path.exists() {
            return FederatedStatus::Unauthenticated;
        }
        match self.load() {
            Ok(status) => status,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Ignoring federated session file");
                FederatedStatus::Unauthenticated
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove federated session file")?;
        }
        debug!(path = ?self.path, "Federated session signed out");
        Ok(())
    }
}
