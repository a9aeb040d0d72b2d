//! Data models for the backend API and the federated session boundary.
//!
//! This module contains the wire types exchanged with the backend:
//!
//! - `ApiResponse`, `ErrorDetail`: the shared response envelope
//! - `TokenData`, `User`, `ResetPasswordData`: payloads carried in `data`
//! - `NextAuthCallbackRequest`, `NextAuthCallbackData`: the OAuth sync handshake
//! - `FederatedStatus`, `FederatedSession`, `FederatedUser`: what the OAuth
//!   provider exposes to the session resolver

pub mod envelope;
pub mod federated;
pub mod user;

pub use envelope::{ApiResponse, ErrorDetail};
pub use federated::{FederatedSession, FederatedStatus, FederatedUser};
pub use user::{
    NextAuthCallbackData, NextAuthCallbackRequest, ResetPasswordData, TokenData, User,
    GITHUB_PROVIDER,
};
