//! Session resolution: reconciles the stored bearer token and the federated
//! OAuth session into one authentication verdict.
//!
//! This module provides:
//! - `SessionState` and the pure `reduce` function over
//!   `(token present, federated status, sync phase)`
//! - `SyncFlag`: the fire-at-most-once guard for the OAuth sync handshake
//! - `ResolvedIdentity`: the display identity, merged field by field
//! - `SessionResolver`: drives evaluation, the handshake and logout, and
//!   publishes each `Resolution` on a watch channel
//!
//! Token expiry is never checked locally. A stale token is discovered when
//! the backend rejects it, and is only cleared by an explicit logout.

pub mod identity;
pub mod resolver;
pub mod state;

pub use identity::ResolvedIdentity;
pub use resolver::{LogoutOutcome, Resolution, SessionResolver};
pub use state::{reduce, SessionState, SyncFlag, SyncPhase};
