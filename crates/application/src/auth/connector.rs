//! Auth connector trait and options.
//!
//! A connector is the only part of the coordinator that talks to the
//! identity backend. Session managers decide *when* to create, refresh or
//! remove a session; connectors decide *how*.

use async_trait::async_trait;
use sessionkit_domain::{AuthResult, ScopeSet, Session};

/// Options for creating a new session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSessionOptions {
    /// Full scope set to ask for, already extended by the session manager.
    pub scopes: ScopeSet,
    /// Open the consent popup right away instead of queueing behind other
    /// pending requests.
    pub instant_popup: bool,
}

/// Trait for auth connectors.
///
/// Implementations either mediate through a backend (start, refresh and
/// logout endpoints) or talk to the provider directly with no silent refresh.
#[async_trait]
pub trait AuthConnector: Send + Sync {
    /// Create a new session, which usually involves user consent.
    ///
    /// # Errors
    /// Returns popup errors if the user abandons the prompt, or any error the
    /// provider reports.
    async fn create_session(&self, options: CreateSessionOptions) -> AuthResult<Session>;

    /// Silently obtain a fresh session from an existing backend-side session.
    ///
    /// # Returns
    /// `Ok(None)` if the connector has no refresh capability.
    async fn refresh_session(&self) -> AuthResult<Option<Session>>;

    /// End the session with the backend.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the logout.
    async fn remove_session(&self) -> AuthResult<()>;
}
