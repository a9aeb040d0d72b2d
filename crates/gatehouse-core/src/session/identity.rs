use serde::Serialize;

use crate::models::{FederatedUser, User};

/// Identity shown to the user. Derived on every evaluation, never persisted.
///
/// Profile fields (email, name, image) prefer the federated session, one
/// field at a time; account metadata (id, creation date, linked provider)
/// only comes from the backend record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub id: Option<String>,
    pub created_at: Option<String>,
    pub provider: Option<String>,
}

impl ResolvedIdentity {
    /// Merge both sources. Returns `None` when neither is available.
    pub fn merge(federated: Option<&FederatedUser>, user: Option<&User>) -> Option<Self> {
        let email = federated
            .map(|f| f.email.clone())
            .filter(|e| !e.is_empty())
            .or_else(|| user.map(|u| u.email.clone()))?;

        Some(Self {
            email,
            name: federated
                .and_then(|f| f.name.clone())
                .or_else(|| user.and_then(|u| u.name.clone())),
            image: federated
                .and_then(|f| f.image.clone())
                .or_else(|| user.and_then(|u| u.image.clone())),
            id: user.map(|u| u.id.clone()),
            created_at: user.and_then(|u| u.created_at.clone()),
            provider: user.and_then(|u| u.provider.clone()),
        })
    }

    /// Name if known, otherwise the email address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_user() -> User {
        User {
            id: "42".into(),
            email: "backend@example.com".into(),
            name: Some("Backend Name".into()),
            image: Some("https://cdn.example/backend.png".into()),
            provider: Some("github".into()),
            created_at: Some("2024-03-01T10:00:00Z".into()),
            updated_at: None,
        }
    }

    #[test]
    fn test_merge_neither_source() {
        assert_eq!(ResolvedIdentity::merge(None, None), None);
    }

    #[test]
    fn test_merge_backend_only() {
        let user = backend_user();
        let identity = ResolvedIdentity::merge(None, Some(&user)).expect("identity");
        assert_eq!(identity.email, "backend@example.com");
        assert_eq!(identity.name.as_deref(), Some("Backend Name"));
        assert_eq!(identity.id.as_deref(), Some("42"));
    }

    #[test]
    fn test_merge_federated_only_has_no_account_metadata() {
        let fed = FederatedUser::new("a@b.com");
        let identity = ResolvedIdentity::merge(Some(&fed), None).expect("identity");
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.id, None);
        assert_eq!(identity.display_name(), "a@b.com");
    }

    #[test]
    fn test_merge_is_field_by_field() {
        let mut fed = FederatedUser::new("gh@example.com");
        fed.image = Some("https://avatars.example/gh.png".into());
        let user = backend_user();

        let identity = ResolvedIdentity::merge(Some(&fed), Some(&user)).expect("identity");
        // Federated wins where it has a value
        assert_eq!(identity.email, "gh@example.com");
        assert_eq!(identity.image.as_deref(), Some("https://avatars.example/gh.png"));
        // Backend fills the gaps
        assert_eq!(identity.name.as_deref(), Some("Backend Name"));
        // Metadata is backend-only
        assert_eq!(identity.id.as_deref(), Some("42"));
        assert_eq!(identity.created_at.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(identity.provider.as_deref(), Some("github"));
    }
}
