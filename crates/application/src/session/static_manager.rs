//! Session manager without refresh.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sessionkit_domain::scope::{extend, satisfies};
use sessionkit_domain::{AuthResult, ScopeSet, Session, SessionState};
use tokio::sync::watch;

use super::{GetSessionOptions, SessionManager, SessionStateTracker};
use crate::auth::{AuthConnector, CreateSessionOptions};

/// Session manager for connectors that cannot refresh.
///
/// A cached session is used until it stops covering the requested scopes;
/// expiry is not checked.
pub struct StaticSessionManager<C> {
    connector: Arc<C>,
    default_scopes: ScopeSet,
    current: Mutex<Option<Session>>,
    state: SessionStateTracker,
}

impl<C: AuthConnector> StaticSessionManager<C> {
    /// Creates a manager with no session.
    pub fn new(connector: Arc<C>, default_scopes: ScopeSet) -> Self {
        Self {
            connector,
            default_scopes,
            current: Mutex::new(None),
            state: SessionStateTracker::new(),
        }
    }
}

#[async_trait]
impl<C: AuthConnector> SessionManager for StaticSessionManager<C> {
    async fn get_session(&self, options: &GetSessionOptions) -> AuthResult<Option<Session>> {
        let cached = self.current.lock().clone();
        if let Some(session) = &cached
            && satisfies(session.scopes(), &options.scopes)
        {
            return Ok(cached);
        }
        if options.optional {
            return Ok(None);
        }

        let scopes = extend(cached.as_ref(), &options.scopes, &self.default_scopes);
        let session = self
            .connector
            .create_session(CreateSessionOptions {
                scopes,
                instant_popup: options.instant_popup,
            })
            .await?;
        *self.current.lock() = Some(session.clone());
        self.state.set_is_signed_in(true);
        Ok(Some(session))
    }

    async fn set_session(&self, session: Option<Session>) {
        let signed_in = session.is_some();
        *self.current.lock() = session;
        self.state.set_is_signed_in(signed_in);
    }

    async fn remove_session(&self) -> AuthResult<()> {
        self.current.lock().take();
        self.connector.remove_session().await?;
        self.state.set_is_signed_in(false);
        Ok(())
    }

    fn session_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}
