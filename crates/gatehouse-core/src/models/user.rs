use serde::{Deserialize, Serialize};

/// Provider identifier sent with every OAuth sync handshake.
pub const GITHUB_PROVIDER: &str = "github";

/// Bearer token issued by `POST /auth/login` and the OAuth sync handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Backend user record. The password hash the backend may include is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Linked identity provider, when the account was created via OAuth
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordData {
    pub email: String,
}

/// Query parameters for `POST /auth/nextauth-callback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextAuthCallbackRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Result of the OAuth sync handshake: the created-or-updated user and a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAuthCallbackData {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<TokenData>,
}

impl NextAuthCallbackData {
    /// The bearer token returned by the handshake, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .map(|t| t.access_token.as_str())
            .filter(|t| !t.is_empty())
    }
}
