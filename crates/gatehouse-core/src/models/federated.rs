use serde::{Deserialize, Serialize};

/// Profile exposed by the federated (OAuth) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Provider-side account id (GitHub numeric id)
    #[serde(default)]
    pub provider_account_id: Option<String>,
    /// Provider-side login handle
    #[serde(default)]
    pub username: Option<String>,
}

impl FederatedUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            image: None,
            provider_account_id: None,
            username: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedSession {
    pub user: FederatedUser,
}

/// Snapshot of the federated session provider.
///
/// Serialized as `{"status": "loading" | "authenticated" | "unauthenticated", "session": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "session", rename_all = "lowercase")]
pub enum FederatedStatus {
    Loading,
    Authenticated(FederatedSession),
    Unauthenticated,
}

impl FederatedStatus {
    pub fn session(&self) -> Option<&FederatedSession> {
        match self {
            FederatedStatus::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&FederatedUser> {
        self.session().map(|s| &s.user)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FederatedStatus::Loading)
    }
}
