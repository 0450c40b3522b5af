//! Session managers.
//!
//! A session manager owns the in-memory session of one provider and decides
//! when a connector has to create, refresh or remove it. The
//! [`SessionStore`] decorator adds persistence on top of any manager.

mod policy;
mod refreshing;
mod state;
mod static_manager;
mod store;

use async_trait::async_trait;
use sessionkit_domain::{AuthResult, ScopeSet, Session, SessionState};
use tokio::sync::watch;

pub use policy::{DEFAULT_REFRESH_WINDOW_SECONDS, RefreshPolicy};
pub use refreshing::RefreshingSessionManager;
pub use state::SessionStateTracker;
pub use static_manager::StaticSessionManager;
pub use store::{SessionStore, storage_key_for};

/// Options for [`SessionManager::get_session`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetSessionOptions {
    /// Scopes the caller needs.
    pub scopes: ScopeSet,
    /// Return nothing instead of prompting the user.
    pub optional: bool,
    /// Skip the silent refresh and open the consent popup right away.
    pub instant_popup: bool,
}

impl GetSessionOptions {
    /// Options requiring `scopes`.
    #[must_use]
    pub fn new(scopes: ScopeSet) -> Self {
        Self {
            scopes,
            ..Self::default()
        }
    }

    /// Marks the request as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Requests an immediate popup.
    #[must_use]
    pub const fn instant_popup(mut self) -> Self {
        self.instant_popup = true;
        self
    }
}

/// Owner of one provider's session.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Returns a session covering `options.scopes`.
    ///
    /// # Returns
    /// `Ok(None)` only when `options.optional` is set and no suitable
    /// session could be obtained without user interaction.
    ///
    /// # Errors
    /// Returns connector errors from session creation or refresh.
    async fn get_session(&self, options: &GetSessionOptions) -> AuthResult<Option<Session>>;

    /// Replaces the current session.
    async fn set_session(&self, session: Option<Session>);

    /// Drops the current session and ends it with the backend.
    ///
    /// # Errors
    /// Returns an error if the backend logout fails.
    async fn remove_session(&self) -> AuthResult<()>;

    /// Subscribes to signed-in state changes.
    fn session_state(&self) -> watch::Receiver<SessionState>;
}
