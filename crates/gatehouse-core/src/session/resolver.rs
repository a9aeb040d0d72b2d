//! The session resolver.
//!
//! Each call to `evaluate` is one pass over the current inputs: the token in
//! the store and the federated provider's status. A pass may start the OAuth
//! sync handshake (at most once per resolver), and after the handshake it
//! re-derives everything from scratch rather than patching the previous
//! result. Results are published on a `watch` channel; a receiver that was
//! dropped simply never sees them.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::identity::ResolvedIdentity;
use super::state::{reduce, SessionState, SyncFlag, SyncPhase};
use crate::auth::{AuthBackend, FederatedSessionProvider, TokenStore};
use crate::error::AuthError;
use crate::models::{FederatedUser, NextAuthCallbackRequest, GITHUB_PROVIDER};

/// Verdict of one evaluation pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub state: SessionState,
    pub identity: Option<ResolvedIdentity>,
    pub error: Option<Arc<AuthError>>,
}

impl Resolution {
    fn bare(state: SessionState) -> Self {
        Self {
            state,
            identity: None,
            error: None,
        }
    }

    fn federated(state: SessionState, user: Option<&FederatedUser>) -> Self {
        Self {
            state,
            identity: ResolvedIdentity::merge(user, None),
            error: None,
        }
    }

    pub fn unknown() -> Self {
        Self::bare(SessionState::Unknown)
    }
}

/// What the presentation layer should do after a logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The federated provider was asked to end its session
    SignedOutFederated,
    /// No federated session existed; show the login surface
    NavigateToLogin,
}

pub struct SessionResolver {
    store: Arc<dyn TokenStore>,
    backend: Arc<dyn AuthBackend>,
    provider: Arc<dyn FederatedSessionProvider>,
    sync: SyncFlag,
    sync_error: Mutex<Option<Arc<AuthError>>>,
    verdict: watch::Sender<Resolution>,
}

impl SessionResolver {
    pub fn new(
        store: Arc<dyn TokenStore>,
        backend: Arc<dyn AuthBackend>,
        provider: Arc<dyn FederatedSessionProvider>,
    ) -> Self {
        let (verdict, _) = watch::channel(Resolution::unknown());
        Self {
            store,
            backend,
            provider,
            sync: SyncFlag::new(),
            sync_error: Mutex::new(None),
            verdict,
        }
    }

    /// Receive every published resolution.
    pub fn subscribe(&self) -> watch::Receiver<Resolution> {
        self.verdict.subscribe()
    }

    /// Most recently published resolution.
    pub fn current(&self) -> Resolution {
        self.verdict.borrow().clone()
    }

    /// Whether the handshake has been attempted by this resolver.
    pub fn sync_attempted(&self) -> bool {
        self.sync.is_set()
    }

    /// State derived from the current inputs, without any network call.
    pub fn derive_state(&self) -> SessionState {
        reduce(
            self.store.read().is_some(),
            &self.provider.status(),
            self.sync.phase(),
        )
    }

    fn publish(&self, resolution: Resolution) -> Resolution {
        debug!(state = %resolution.state, has_identity = resolution.identity.is_some(), "Session resolved");
        self.verdict.send_replace(resolution.clone());
        resolution
    }

    /// Run one evaluation pass and publish its verdict.
    ///
    /// While the federated status is loading the result is `Unknown` and
    /// nothing is published.
    pub async fn evaluate(&self) -> Resolution {
        loop {
            let federated = self.provider.status();
            let token = self.store.read();
            let state = reduce(token.is_some(), &federated, self.sync.phase());
            debug!(state = %state, token_present = token.is_some(), "Session state derived");

            match state {
                SessionState::Unknown => return Resolution::unknown(),
                SessionState::Unauthenticated => {
                    return self.publish(Resolution::bare(SessionState::Unauthenticated))
                }
                SessionState::AuthenticatedFederated => {
                    return self.publish(Resolution::federated(state, federated.user()))
                }
                SessionState::SyncFailed => {
                    let mut resolution = Resolution::federated(state, federated.user());
                    resolution.error = self.sync_error.lock().ok().and_then(|e| e.clone());
                    return self.publish(resolution);
                }
                SessionState::AuthenticatedLocal | SessionState::AuthenticatedBoth => {
                    let token = token.unwrap_or_default();
                    match self.resolve_identity(state, &token, federated.user()).await {
                        Some(resolution) => return self.publish(resolution),
                        // Inputs changed while the fetch was in flight
                        None => continue,
                    }
                }
                SessionState::Syncing => {
                    let Some(user) = federated.user() else {
                        return Resolution::unknown();
                    };
                    // Claim before awaiting anything
                    if !self.sync.try_claim() {
                        return self.publish(Resolution::federated(state, Some(user)));
                    }
                    self.publish(Resolution::federated(state, Some(user)));
                    self.handshake(user).await;
                    // Full re-derivation from the store and provider
                    continue;
                }
                // Produced only by resolve_identity, never by reduce
                SessionState::AuthenticationError => {
                    return self.publish(Resolution::bare(state));
                }
            }
        }
    }

    /// Fetch the backend record for `token` and merge it with the federated
    /// profile. Returns `None` if the stored token changed meanwhile.
    async fn resolve_identity(
        &self,
        state: SessionState,
        token: &str,
        federated: Option<&FederatedUser>,
    ) -> Option<Resolution> {
        let result = self.backend.current_user().await;

        if self.store.read().as_deref() != Some(token) {
            debug!("Token changed during identity fetch, re-deriving");
            return None;
        }

        Some(match result {
            Ok(user) => Resolution {
                state,
                identity: ResolvedIdentity::merge(federated, Some(&user)),
                error: None,
            },
            Err(e) => {
                let err = AuthError::from_identity_fetch(e);
                warn!(error = %err, "Failed to verify stored token");
                Resolution {
                    state: SessionState::AuthenticationError,
                    identity: None,
                    error: Some(Arc::new(err)),
                }
            }
        })
    }

    /// Register the federated user with the backend and persist the token it returns.
    async fn handshake(&self, user: &FederatedUser) {
        let request = NextAuthCallbackRequest {
            email: user.email.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
            provider: GITHUB_PROVIDER.to_string(),
            provider_id: user.provider_account_id.clone(),
            username: user.username.clone(),
        };
        info!(email = %user.email, "Syncing federated sign-in with backend");

        match self.backend.sync_federated_user(&request).await {
            Ok(data) => match data.access_token() {
                Some(token) => match self.sync.complete(|| self.store.save(token)) {
                    Ok(true) => info!(email = %user.email, "Federated user synced with backend"),
                    Ok(false) => info!("Logged out during federated sync, discarding token"),
                    Err(e) => {
                        error!(error = %e, "Failed to persist token from federated sync");
                        self.fail_sync(AuthError::Storage(e));
                    }
                },
                None => {
                    warn!("Federated sync succeeded without returning a token");
                    self.sync.finish(SyncPhase::CompletedWithoutToken);
                }
            },
            Err(e) => {
                error!(error = %e, "Failed to sync federated user with backend");
                self.fail_sync(AuthError::Sync(e));
            }
        }
    }

    fn fail_sync(&self, err: AuthError) {
        if let Ok(mut slot) = self.sync_error.lock() {
            *slot = Some(Arc::new(err));
        }
        self.sync.finish(SyncPhase::Failed);
    }

    /// Clear the stored token, then end the federated session if one exists.
    ///
    /// The token is always cleared first; if that fails nothing else happens.
    /// Clearing also consumes the sync flag, so neither a handshake already in
    /// flight nor a later evaluation can store a new token. `Unauthenticated`
    /// is published even when the federated sign-out fails.
    pub async fn logout(&self) -> Result<LogoutOutcome, AuthError> {
        self.sync
            .revoke(|| self.store.clear())
            .map_err(AuthError::Storage)?;
        info!("Stored token cleared");

        let result = if self.provider.status().session().is_some() {
            match self.provider.sign_out().await {
                Ok(()) => {
                    info!("Federated session signed out");
                    Ok(LogoutOutcome::SignedOutFederated)
                }
                Err(e) => {
                    error!(error = %e, "Federated sign-out failed");
                    Err(AuthError::SignOut(e))
                }
            }
        } else {
            Ok(LogoutOutcome::NavigateToLogin)
        };

        self.publish(Resolution::bare(SessionState::Unauthenticated));
        result
    }
}
