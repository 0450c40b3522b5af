//! Direct auth connector.

use async_trait::async_trait;
use sessionkit_application::auth::{AuthConnector, CreateSessionOptions};
use sessionkit_domain::{AuthProviderInfo, AuthResult, Session};

use super::backend::{AuthBackend, ConnectorOptions};

/// Connector that opens the consent popup right away and cannot refresh.
pub struct DirectAuthConnector {
    backend: AuthBackend,
}

impl DirectAuthConnector {
    /// Creates a connector.
    #[must_use]
    pub fn new(options: ConnectorOptions) -> Self {
        Self {
            backend: AuthBackend::new(options),
        }
    }

    /// Provider this connector signs in to.
    #[must_use]
    pub const fn provider(&self) -> &AuthProviderInfo {
        self.backend.provider()
    }
}

#[async_trait]
impl AuthConnector for DirectAuthConnector {
    async fn create_session(&self, options: CreateSessionOptions) -> AuthResult<Session> {
        self.backend.login_popup(&options.scopes).await
    }

    async fn refresh_session(&self) -> AuthResult<Option<Session>> {
        Ok(None)
    }

    async fn remove_session(&self) -> AuthResult<()> {
        self.backend.logout().await
    }
}
