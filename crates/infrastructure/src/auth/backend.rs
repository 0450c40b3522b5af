//! Auth backend endpoints shared by the connectors.

use std::sync::Arc;

use sessionkit_application::auth::{LoginPopupOptions, show_login_popup};
use sessionkit_application::ports::{Clock, DiscoveryApi, WindowHost};
use sessionkit_domain::scope::join_scopes;
use sessionkit_domain::{
    AuthError, AuthProviderInfo, ErrorPayload, ProviderConfig, ScopeSet, Session, SessionPayload,
};
use url::Url;

/// Header marking requests as scripted, which the backend uses to reject
/// cross-site form posts.
const REQUESTED_WITH: (&str, &str) = ("x-requested-with", "XMLHttpRequest");

/// Everything a connector needs from its environment.
#[derive(Clone)]
pub struct ConnectorOptions {
    /// Provider, environment and popup settings.
    pub config: ProviderConfig,
    /// Locates the auth backend.
    pub discovery: Arc<dyn DiscoveryApi>,
    /// Window the consent popup is opened from.
    pub window: Arc<dyn WindowHost>,
    /// Anchors relative expiries in backend responses.
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ConnectorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorOptions")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

pub(crate) struct AuthBackend {
    config: ProviderConfig,
    discovery: Arc<dyn DiscoveryApi>,
    window: Arc<dyn WindowHost>,
    clock: Arc<dyn Clock>,
    http: reqwest::Client,
}

impl AuthBackend {
    pub(crate) fn new(options: ConnectorOptions) -> Self {
        Self {
            config: options.config,
            discovery: options.discovery,
            window: options.window,
            clock: options.clock,
            http: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub(crate) const fn provider(&self) -> &AuthProviderInfo {
        &self.config.provider
    }

    async fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, AuthError> {
        let base = self
            .discovery
            .get_base_url(&self.config.discovery_plugin_id)
            .await?;
        let raw = format!("{base}/{}{path}", self.config.provider.id);
        let mut url = Url::parse(&raw).map_err(|e| AuthError::Configuration {
            message: format!("Invalid auth backend URL '{raw}': {e}"),
        })?;
        url.query_pairs_mut()
            .extend_pairs(query)
            .append_pair("env", &self.config.environment);
        Ok(url)
    }

    /// Runs the consent popup for `scopes` and turns its response into a session.
    pub(crate) async fn login_popup(&self, scopes: &ScopeSet) -> Result<Session, AuthError> {
        let scope = join_scopes(scopes);
        let origin = self.window.origin();
        let url = self
            .build_url("/start", &[("scope", scope.as_str()), ("origin", origin.as_str())])
            .await?;

        tracing::debug!(provider = %self.config.provider.id, scope = %scope, "opening login popup");
        let payload = show_login_popup(
            self.window.as_ref(),
            &LoginPopupOptions {
                url: url.to_string(),
                name: format!("{} Login", self.config.provider.title),
                origin: url.origin().ascii_serialization(),
                width: Some(self.config.popup.width),
                height: Some(self.config.popup.height),
            },
        )
        .await?;

        SessionPayload::from_value(payload)?.into_session(self.clock.now())
    }

    /// Asks the backend for a fresh session using its own cookie session.
    pub(crate) async fn refresh(&self) -> Result<Session, AuthError> {
        let url = self.build_url("/refresh", &[]).await?;
        let response = self
            .http
            .get(url)
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .send()
            .await
            .map_err(|e| AuthError::Network {
                message: format!("Auth refresh request failed, {e}"),
                status: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Network {
                message: format!(
                    "Auth refresh request failed, {}",
                    status.canonical_reason().unwrap_or("unknown status")
                ),
                status: Some(status.as_u16()),
            });
        }

        let mut body: serde_json::Value =
            response.json().await.map_err(|e| AuthError::InvalidResponse {
                message: format!("Failed to parse refresh response: {e}"),
            })?;
        if let Some(error) = body
            .get_mut("error")
            .filter(|error| !error.is_null())
            .map(serde_json::Value::take)
        {
            let error: ErrorPayload =
                serde_json::from_value(error).map_err(|e| AuthError::InvalidResponse {
                    message: format!("Failed to parse refresh error: {e}"),
                })?;
            return Err(error.into());
        }

        let session = SessionPayload::from_value(body)?.into_session(self.clock.now())?;
        tracing::debug!(provider = %self.config.provider.id, "session refreshed");
        Ok(session)
    }

    /// Ends the backend session.
    pub(crate) async fn logout(&self) -> Result<(), AuthError> {
        let url = self.build_url("/logout", &[]).await?;
        let response = self
            .http
            .post(url)
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .send()
            .await
            .map_err(|e| AuthError::Network {
                message: format!("Logout request failed, {e}"),
                status: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Network {
                message: format!(
                    "Logout request failed, {}",
                    status.canonical_reason().unwrap_or("unknown status")
                ),
                status: Some(status.as_u16()),
            });
        }
        Ok(())
    }
}
