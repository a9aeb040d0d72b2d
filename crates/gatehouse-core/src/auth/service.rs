use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::AuthError;
use crate::models::{
    ApiResponse, NextAuthCallbackData, NextAuthCallbackRequest, ResetPasswordData, TokenData, User,
};
use crate::validation::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};

const LOGIN_PATH: &str = "/auth/login";
const ME_PATH: &str = "/auth/me";
const NEXTAUTH_CALLBACK_PATH: &str = "/auth/nextauth-callback";
const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
const REGISTER_PATH: &str = "/user";

/// Backend operations the session resolver depends on.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Fetch the user the stored bearer token belongs to.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Register (or update) a federated identity and obtain a bearer token.
    async fn sync_federated_user(
        &self,
        request: &NextAuthCallbackRequest,
    ) -> Result<NextAuthCallbackData, ApiError>;
}

/// Typed auth operations over the backend API.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Exchange email and password for a bearer token.
    pub async fn login(&self, form: &LoginForm) -> Result<TokenData, AuthError> {
        form.validate()?;
        let body = json!({ "email": form.email.trim(), "password": form.password });
        let response: ApiResponse<TokenData> = self.api.post(LOGIN_PATH, &body).await?;
        Ok(response.into_data()?)
    }

    /// Log in and persist the returned token, replacing any previous one.
    pub async fn sign_in(&self, form: &LoginForm) -> Result<TokenData, AuthError> {
        let token = self.login(form).await?;
        self.api
            .token_store()
            .save(&token.access_token)
            .map_err(AuthError::Storage)?;
        info!("Login successful");
        Ok(token)
    }

    /// Create an account. The user still has to log in afterwards.
    pub async fn register(&self, form: &RegisterForm) -> Result<ApiResponse<User>, AuthError> {
        form.validate()?;
        let body = json!({ "email": form.email.trim(), "password": form.password });
        let response: ApiResponse<User> = self.api.post(REGISTER_PATH, &body).await?;
        debug!(success = response.success, "Registration response received");
        Ok(response)
    }

    /// Ask the backend to email a password reset link.
    pub async fn forgot_password(
        &self,
        form: &ForgotPasswordForm,
    ) -> Result<ApiResponse<Value>, AuthError> {
        form.validate()?;
        let body = json!({ "email": form.email.trim() });
        Ok(self.api.post(FORGOT_PASSWORD_PATH, &body).await?)
    }

    /// Set a new password using the token from the reset link.
    pub async fn reset_password(
        &self,
        form: &ResetPasswordForm,
    ) -> Result<ApiResponse<ResetPasswordData>, AuthError> {
        form.validate()?;
        let body = json!({ "token": form.token.trim(), "new_password": form.password });
        Ok(self.api.post(RESET_PASSWORD_PATH, &body).await?)
    }

    /// Fetch the current user. A 401 means the stored token is stale.
    pub async fn current_user(&self) -> Result<User, AuthError> {
        self.fetch_current_user()
            .await
            .map_err(AuthError::from_identity_fetch)
    }

    /// Register a federated identity with the backend (create-or-update).
    pub async fn next_auth_callback(
        &self,
        request: &NextAuthCallbackRequest,
    ) -> Result<NextAuthCallbackData, AuthError> {
        self.sync_federated(request).await.map_err(AuthError::Sync)
    }

    async fn fetch_current_user(&self) -> Result<User, ApiError> {
        let response: ApiResponse<User> = self.api.get(ME_PATH).await?;
        response.into_data()
    }

    async fn sync_federated(
        &self,
        request: &NextAuthCallbackRequest,
    ) -> Result<NextAuthCallbackData, ApiError> {
        let response: ApiResponse<NextAuthCallbackData> =
            self.api.post_query(NEXTAUTH_CALLBACK_PATH, request).await?;
        if !response.success {
            warn!(message = %response.message, "Federated sync reported failure");
        }
        response.into_data()
    }
}

#[async_trait]
impl AuthBackend for AuthService {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch_current_user().await
    }

    async fn sync_federated_user(
        &self,
        request: &NextAuthCallbackRequest,
    ) -> Result<NextAuthCallbackData, ApiError> {
        self.sync_federated(request).await
    }
}
