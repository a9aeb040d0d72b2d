//! Wiring of the token store, API client, auth service and session resolver
//! from a `Config`.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::api::ApiClient;
use crate::auth::{AuthService, FederatedSessionProvider, TokenStore};
use crate::config::Config;
use crate::session::SessionResolver;

/// Everything a front-end needs, built once per process.
pub struct AuthContext {
    pub config: Config,
    pub store: Arc<dyn TokenStore>,
    pub service: AuthService,
    pub resolver: SessionResolver,
}

impl AuthContext {
    pub fn from_config(config: Config) -> Result<Self> {
        let store = config.token_store();
        let provider = config.federated_provider();
        Self::with_parts(config, store, provider)
    }

    /// Build with explicit storage and federated provider.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn TokenStore>,
        provider: Arc<dyn FederatedSessionProvider>,
    ) -> Result<Self> {
        let api = ApiClient::new(config.api_url()?, store.clone(), config.request_timeout())?;
        debug!(base_url = api.base_url(), backend = ?config.token_backend, "Auth context configured");

        let service = AuthService::new(api);
        let resolver = SessionResolver::new(store.clone(), Arc::new(service.clone()), provider);

        Ok(Self {
            config,
            store,
            service,
            resolver,
        })
    }
}
