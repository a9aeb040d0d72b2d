use thiserror::Error;

use crate::api::ApiError;
use crate::validation::ValidationErrors;

/// Failures surfaced by the auth service and the session resolver.
///
/// None of these are fatal: each maps to a user-visible state with a
/// recovery action (retry login, request a new reset link, log out).
#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend rejected the request or could not be reached.
    #[error(transparent)]
    Request(#[from] ApiError),

    /// Client-side form validation failed; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The OAuth-to-backend sync handshake failed.
    #[error("Failed to sync federated sign-in with the backend: {0}")]
    Sync(#[source] ApiError),

    /// A bearer-authenticated call was rejected as unauthorized.
    #[error("Stored token was rejected by the backend")]
    StaleToken,

    /// The token could not be written to or removed from storage.
    #[error("Token storage failed: {0:#}")]
    Storage(anyhow::Error),

    /// The federated provider could not end its session.
    #[error("Federated sign-out failed: {0:#}")]
    SignOut(anyhow::Error),
}

impl AuthError {
    /// Map an identity fetch failure, separating rejected tokens from other failures.
    pub fn from_identity_fetch(error: ApiError) -> Self {
        if error.is_unauthorized() {
            AuthError::StaleToken
        } else {
            AuthError::Request(error)
        }
    }

    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(errors) => errors.to_string(),
            AuthError::StaleToken => {
                "Failed to verify your login status. Log out and sign in again.".to_string()
            }
            AuthError::Sync(_) => {
                "Signed in with GitHub, but the account could not be linked. Reload to try again."
                    .to_string()
            }
            AuthError::Storage(_) => "Could not save your login on this device.".to_string(),
            AuthError::SignOut(_) => "Could not sign out of GitHub. Please try again.".to_string(),
            AuthError::Request(ApiError::Network(e)) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            AuthError::Request(ApiError::Network(_)) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            AuthError::Request(ApiError::Request { status: 401, .. }) => {
                "Invalid email or password".to_string()
            }
            AuthError::Request(ApiError::Request { message, .. }) => message.clone(),
            AuthError::Request(ApiError::InvalidRequest(msg)) => format!("Request failed: {}", msg),
            AuthError::Request(ApiError::MissingData(_)) => {
                "The server sent an unexpected response. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_fetch_401_is_stale_token() {
        let err = AuthError::from_identity_fetch(ApiError::from_status(401, r#"{"message": "expired"}"#));
        assert!(matches!(err, AuthError::StaleToken));
    }

    #[test]
    fn test_identity_fetch_other_status_is_request_error() {
        let err = AuthError::from_identity_fetch(ApiError::from_status(503, "{}"));
        assert!(matches!(err, AuthError::Request(_)));
    }

    #[test]
    fn test_user_message_uses_backend_message() {
        let err = AuthError::Request(ApiError::from_status(
            400,
            r#"{"message": "Reset token has expired"}"#,
        ));
        assert_eq!(err.user_message(), "Reset token has expired");

        let unauthorized = AuthError::Request(ApiError::from_status(401, "{}"));
        assert_eq!(unauthorized.user_message(), "Invalid email or password");
    }
}
