//! Gatehouse core - client-side authentication against the gatehouse backend.
//!
//! Login, registration and password reset go through `AuthService`. The
//! `SessionResolver` reconciles the locally stored bearer token with a
//! federated (GitHub OAuth) session into a single verdict, running the
//! one-time OAuth-to-backend sync handshake when needed.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod session;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthBackend, AuthService, FederatedSessionProvider, TokenStore};
pub use config::{Config, TokenBackend};
pub use context::AuthContext;
pub use error::AuthError;
pub use session::{LogoutOutcome, Resolution, ResolvedIdentity, SessionResolver, SessionState};
pub use validation::{
    ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm, ValidationErrors,
};
