//! Authentication module: token persistence, backend auth calls and the
//! federated (OAuth) session boundary.
//!
//! This module provides:
//! - `TokenStore`: single-slot bearer token storage (memory, file, keychain)
//! - `AuthService`: typed login, registration and password-reset operations
//! - `FederatedSessionProvider`: read-only view of an external OAuth session

pub mod federated;
pub mod service;
pub mod token_store;

pub use federated::{FederatedSessionProvider, FileFederatedProvider, StaticFederatedProvider};
pub use service::{AuthBackend, AuthService};
pub use token_store::{
    FileTokenStore, KeyringTokenStore, MemoryTokenStore, StoredToken, TokenStore,
    TOKEN_STORAGE_KEY,
};
