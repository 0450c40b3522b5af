//! Caller-facing `OAuth2` client.

use sessionkit_domain::scope::normalize_scopes;
use sessionkit_domain::{
    AuthError, AuthProviderInfo, ProfileInfo, ScopeSet, Session, SessionState, SignInIdentity,
    scope_set,
};
use tokio::sync::watch;

use crate::session::{GetSessionOptions, SessionManager};

/// Options shared by the token getters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthRequestOptions {
    /// Return nothing instead of prompting the user.
    pub optional: bool,
    /// Skip the silent refresh and open the consent popup right away.
    pub instant_popup: bool,
}

impl AuthRequestOptions {
    /// Options that never prompt.
    #[must_use]
    pub const fn optional() -> Self {
        Self {
            optional: true,
            instant_popup: false,
        }
    }

    fn with_scopes(self, scopes: ScopeSet) -> GetSessionOptions {
        GetSessionOptions {
            scopes,
            optional: self.optional,
            instant_popup: self.instant_popup,
        }
    }
}

/// Access tokens, identity and profile for one provider.
pub struct OAuth2Client<M> {
    provider: AuthProviderInfo,
    manager: M,
}

impl<M: SessionManager> OAuth2Client<M> {
    /// Creates a client over `manager`.
    pub const fn new(provider: AuthProviderInfo, manager: M) -> Self {
        Self { provider, manager }
    }

    /// Provider this client signs in to.
    #[must_use]
    pub const fn provider(&self) -> &AuthProviderInfo {
        &self.provider
    }

    /// The session manager behind this client.
    pub const fn session_manager(&self) -> &M {
        &self.manager
    }

    /// Returns an access token covering `scope`.
    ///
    /// `scope` may separate scopes with whitespace or commas.
    ///
    /// # Errors
    /// Returns the error that prevented obtaining a session.
    pub async fn get_access_token(
        &self,
        scope: &str,
        options: AuthRequestOptions,
    ) -> Result<Option<String>, AuthError> {
        let session = self.session(options.with_scopes(normalize_scopes(scope))).await?;
        Ok(session.map(|session| session.provider_info.access_token))
    }

    /// Returns the `OpenID` Connect id token.
    ///
    /// # Errors
    /// Returns the error that prevented obtaining a session.
    pub async fn get_id_token(&self, options: AuthRequestOptions) -> Result<Option<String>, AuthError> {
        let session = self.session(options.with_scopes(scope_set(["openid"]))).await?;
        Ok(session.and_then(|session| session.provider_info.id_token))
    }

    /// Returns the user's profile.
    ///
    /// # Errors
    /// Returns the error that prevented obtaining a session.
    pub async fn get_profile(&self, options: AuthRequestOptions) -> Result<Option<ProfileInfo>, AuthError> {
        let session = self.session(options.with_scopes(ScopeSet::new())).await?;
        Ok(session.map(|session| session.profile))
    }

    /// Returns the platform identity issued alongside the provider tokens.
    ///
    /// # Errors
    /// Returns the error that prevented obtaining a session.
    pub async fn get_identity(
        &self,
        options: AuthRequestOptions,
    ) -> Result<Option<SignInIdentity>, AuthError> {
        let session = self.session(options.with_scopes(ScopeSet::new())).await?;
        Ok(session.and_then(|session| session.identity))
    }

    /// Makes sure a session exists, prompting if needed.
    ///
    /// # Errors
    /// Returns the error that prevented obtaining a session.
    pub async fn sign_in(&self) -> Result<(), AuthError> {
        self.manager.get_session(&GetSessionOptions::default()).await?;
        tracing::info!(provider = %self.provider.id, "signed in");
        Ok(())
    }

    /// Ends the session.
    ///
    /// # Errors
    /// Returns an error if the backend logout fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.manager.remove_session().await?;
        tracing::info!(provider = %self.provider.id, "signed out");
        Ok(())
    }

    /// Subscribes to signed-in state changes.
    #[must_use]
    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.manager.session_state()
    }

    async fn session(&self, options: GetSessionOptions) -> Result<Option<Session>, AuthError> {
        self.manager.get_session(&options).await
    }
}
