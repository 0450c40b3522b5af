//! Client wiring.
//!
//! Builds ready-to-use `OAuth2` clients from a [`ProviderConfig`]: connector,
//! session manager and session store, sharing one refresh policy.

use std::sync::Arc;

use sessionkit_application::ports::{Clock, DiscoveryApi, KeyValueStorage, WindowHost};
use sessionkit_application::{
    OAuth2Client, OAuthRequestManager, RefreshPolicy, RefreshingSessionManager, SessionStore,
    StaticSessionManager,
};
use sessionkit_domain::{AuthError, ProviderConfig};

use crate::auth::{ConnectorOptions, DirectAuthConnector, MediatedAuthConnector};

/// Client for a backend-mediated provider.
pub type MediatedClient =
    OAuth2Client<SessionStore<RefreshingSessionManager<MediatedAuthConnector>>>;

/// Client for a direct provider.
pub type DirectClient = OAuth2Client<SessionStore<StaticSessionManager<DirectAuthConnector>>>;

/// Services shared by every client of one application.
#[derive(Clone)]
pub struct ClientEnvironment {
    /// Locates the auth backend.
    pub discovery: Arc<dyn DiscoveryApi>,
    /// Window consent popups are opened from.
    pub window: Arc<dyn WindowHost>,
    /// Where sessions are persisted.
    pub storage: Arc<dyn KeyValueStorage>,
    /// Time source for expiry decisions.
    pub clock: Arc<dyn Clock>,
}

impl ClientEnvironment {
    fn connector_options(&self, config: &ProviderConfig) -> ConnectorOptions {
        ConnectorOptions {
            config: config.clone(),
            discovery: Arc::clone(&self.discovery),
            window: Arc::clone(&self.window),
            clock: Arc::clone(&self.clock),
        }
    }

    fn refresh_policy(&self, config: &ProviderConfig) -> Result<RefreshPolicy, AuthError> {
        Ok(RefreshPolicy::expires_within(
            Arc::clone(&self.clock),
            config.refresh_window()?,
        ))
    }
}

impl std::fmt::Debug for ClientEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientEnvironment").finish_non_exhaustive()
    }
}

/// Builds a client that refreshes silently through the auth backend and
/// funnels logins through `requests`.
///
/// # Errors
/// Returns a configuration error if `config` is invalid.
pub fn mediated_client(
    config: ProviderConfig,
    env: &ClientEnvironment,
    requests: &OAuthRequestManager,
) -> Result<MediatedClient, AuthError> {
    config.validate()?;
    let policy = env.refresh_policy(&config)?;
    let connector = Arc::new(MediatedAuthConnector::new(
        env.connector_options(&config),
        requests,
    ));
    let manager = RefreshingSessionManager::new(connector, config.default_scope_set(), policy.clone());
    let store = SessionStore::new(manager, Arc::clone(&env.storage), &config.provider.id, policy);
    tracing::debug!(provider = %config.provider.id, "mediated client ready");
    Ok(OAuth2Client::new(config.provider, store))
}

/// Builds a client that prompts directly and never refreshes.
///
/// # Errors
/// Returns a configuration error if `config` is invalid.
pub fn direct_client(config: ProviderConfig, env: &ClientEnvironment) -> Result<DirectClient, AuthError> {
    config.validate()?;
    let policy = env.refresh_policy(&config)?;
    let connector = Arc::new(DirectAuthConnector::new(env.connector_options(&config)));
    let manager = StaticSessionManager::new(connector, config.default_scope_set());
    let store = SessionStore::new(manager, Arc::clone(&env.storage), &config.provider.id, policy);
    tracing::debug!(provider = %config.provider.id, "direct client ready");
    Ok(OAuth2Client::new(config.provider, store))
}
