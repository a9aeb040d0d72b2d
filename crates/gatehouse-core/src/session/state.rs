use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::FederatedStatus;

/// Authentication state of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Federated status still loading; no verdict yet
    Unknown,
    Unauthenticated,
    /// Bearer token only
    AuthenticatedLocal,
    /// Federated session only (handshake done, no token held)
    AuthenticatedFederated,
    /// Federated session present, handshake in flight
    Syncing,
    AuthenticatedBoth,
    /// Federated session present, handshake attempted and failed
    SyncFailed,
    /// A token is held but the backend would not confirm it.
    /// Entered by the resolver after a failed identity fetch, never by `reduce`.
    AuthenticationError,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            SessionState::AuthenticatedLocal
                | SessionState::AuthenticatedFederated
                | SessionState::AuthenticatedBoth
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Unknown => "unknown",
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::AuthenticatedLocal => "authenticated (local token)",
            SessionState::AuthenticatedFederated => "authenticated (GitHub)",
            SessionState::Syncing => "syncing GitHub sign-in",
            SessionState::AuthenticatedBoth => "authenticated (GitHub + local token)",
            SessionState::SyncFailed => "GitHub sign-in sync failed",
            SessionState::AuthenticationError => "authentication error",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress of the one-time OAuth sync handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncPhase {
    NotAttempted,
    InFlight,
    Failed,
    /// The backend returned a token and it was persisted
    Completed,
    /// The backend accepted the handshake but returned no token
    CompletedWithoutToken,
    /// A logout consumed the handshake; the federated session no longer counts
    SignedOut,
}

/// Derive the session state from its three inputs.
///
/// Never returns `AuthenticationError`; that state depends on the outcome of
/// an identity fetch, which only the resolver performs.
pub fn reduce(token_present: bool, federated: &FederatedStatus, sync: SyncPhase) -> SessionState {
    match (federated, token_present) {
        (FederatedStatus::Loading, _) => SessionState::Unknown,
        (FederatedStatus::Unauthenticated, false) => SessionState::Unauthenticated,
        (FederatedStatus::Unauthenticated, true) => SessionState::AuthenticatedLocal,
        (FederatedStatus::Authenticated(_), true) => SessionState::AuthenticatedBoth,
        (FederatedStatus::Authenticated(_), false) => match sync {
            SyncPhase::NotAttempted | SyncPhase::InFlight => SessionState::Syncing,
            SyncPhase::Failed => SessionState::SyncFailed,
            SyncPhase::Completed | SyncPhase::CompletedWithoutToken => {
                SessionState::AuthenticatedFederated
            }
            SyncPhase::SignedOut => SessionState::Unauthenticated,
        },
    }
}

/// Single-assignment guard for the OAuth sync handshake.
///
/// `try_claim` succeeds exactly once for the lifetime of the flag. It must be
/// called before the handshake is awaited so that overlapping evaluations
/// cannot both start one. Once set, the flag is never reset: a new flag (a
/// fresh page load, a new process) is the only way to try again.
///
/// A logout `revoke`s the flag. After that an in-flight handshake can no
/// longer record an outcome or persist its token.
#[derive(Debug)]
pub struct SyncFlag {
    claimed: AtomicBool,
    phase: Mutex<SyncPhase>,
}

impl Default for SyncFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncFlag {
    pub fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
            phase: Mutex::new(SyncPhase::NotAttempted),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SyncPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the handshake. Returns `true` only for the first caller.
    pub fn try_claim(&self) -> bool {
        let won = self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            let mut phase = self.lock();
            if *phase == SyncPhase::NotAttempted {
                *phase = SyncPhase::InFlight;
            }
        }
        won
    }

    pub fn is_set(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> SyncPhase {
        let stored = *self.lock();
        // Claimed but not yet recorded: treat as in flight
        if stored == SyncPhase::NotAttempted && self.is_set() {
            SyncPhase::InFlight
        } else {
            stored
        }
    }

    /// Record the handshake outcome. Ignored unless a handshake is in flight.
    pub fn finish(&self, outcome: SyncPhase) {
        let mut phase = self.lock();
        if self.is_set() && matches!(*phase, SyncPhase::NotAttempted | SyncPhase::InFlight) {
            *phase = outcome;
        }
    }

    /// Run `persist` and mark the handshake `Completed`, holding the phase
    /// lock throughout. Returns `Ok(false)` without calling `persist` when
    /// the handshake is no longer in flight.
    pub fn complete<E>(&self, persist: impl FnOnce() -> Result<(), E>) -> Result<bool, E> {
        let mut phase = self.lock();
        if !self.is_set() || !matches!(*phase, SyncPhase::NotAttempted | SyncPhase::InFlight) {
            return Ok(false);
        }
        persist()?;
        *phase = SyncPhase::Completed;
        Ok(true)
    }

    /// Run `clear` and, if it succeeds, consume the flag as `SignedOut`.
    ///
    /// Serialized with `complete`, so a handshake that finishes afterwards
    /// cannot write its token back.
    pub fn revoke<E>(&self, clear: impl FnOnce() -> Result<(), E>) -> Result<(), E> {
        let mut phase = self.lock();
        clear()?;
        self.claimed.store(true, Ordering::Release);
        *phase = SyncPhase::SignedOut;
        Ok(())
    }
}
