//! Backend-mediated auth connector.

use std::sync::Arc;

use async_trait::async_trait;
use sessionkit_application::auth::{AuthConnector, CreateSessionOptions};
use sessionkit_application::requests::{AuthRequester, OAuthRequestManager};
use sessionkit_domain::{AuthProviderInfo, AuthResult, ScopeSet, Session};

use super::backend::{AuthBackend, ConnectorOptions};

/// Connector for providers whose tokens are held by the auth backend.
///
/// Consent goes through the popup; unless an instant popup is requested the
/// popup is queued behind the request manager so concurrent callers share
/// one prompt. Refresh and logout are cookie-credentialed backend calls.
pub struct MediatedAuthConnector {
    backend: Arc<AuthBackend>,
    requester: AuthRequester<Session>,
}

impl MediatedAuthConnector {
    /// Creates a connector registering its login handler with `requests`.
    #[must_use]
    pub fn new(options: ConnectorOptions, requests: &OAuthRequestManager) -> Self {
        let backend = Arc::new(AuthBackend::new(options));
        let popup_backend = Arc::clone(&backend);
        let requester = requests.create_auth_requester(
            backend.provider().clone(),
            move |scopes: ScopeSet| {
                let backend = Arc::clone(&popup_backend);
                async move { backend.login_popup(&scopes).await }
            },
        );
        Self { backend, requester }
    }

    /// Provider this connector signs in to.
    #[must_use]
    pub fn provider(&self) -> &AuthProviderInfo {
        self.backend.provider()
    }
}

#[async_trait]
impl AuthConnector for MediatedAuthConnector {
    async fn create_session(&self, options: CreateSessionOptions) -> AuthResult<Session> {
        if options.instant_popup {
            return self.backend.login_popup(&options.scopes).await;
        }
        self.requester.request(options.scopes).await
    }

    async fn refresh_session(&self) -> AuthResult<Option<Session>> {
        self.backend.refresh().await.map(Some)
    }

    async fn remove_session(&self) -> AuthResult<()> {
        self.backend.logout().await
    }
}
