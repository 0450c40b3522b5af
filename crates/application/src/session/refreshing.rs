//! Session manager with silent refresh.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use sessionkit_domain::scope::{extend, satisfies};
use sessionkit_domain::{AuthError, AuthResult, ScopeSet, Session, SessionState};
use tokio::sync::watch;

use super::{GetSessionOptions, RefreshPolicy, SessionManager, SessionStateTracker};
use crate::auth::{AuthConnector, CreateSessionOptions};

type SharedRefresh = Shared<BoxFuture<'static, Result<Session, AuthError>>>;

/// Single-flight slot for the refresh call.
enum RefreshState {
    Idle,
    Pending(SharedRefresh),
}

/// Session manager for connectors that can refresh silently.
///
/// Concurrent refreshes are collapsed into a single connector call whose
/// result is handed to every caller that attached while it was in flight.
pub struct RefreshingSessionManager<C> {
    connector: Arc<C>,
    default_scopes: ScopeSet,
    policy: RefreshPolicy,
    current: Mutex<Option<Session>>,
    refresh: Mutex<RefreshState>,
    state: SessionStateTracker,
}

impl<C: AuthConnector + 'static> RefreshingSessionManager<C> {
    /// Creates a manager with no session.
    pub fn new(connector: Arc<C>, default_scopes: ScopeSet, policy: RefreshPolicy) -> Self {
        Self {
            connector,
            default_scopes,
            policy,
            current: Mutex::new(None),
            refresh: Mutex::new(RefreshState::Idle),
            state: SessionStateTracker::new(),
        }
    }

    /// Refreshes through the connector, attaching to a refresh already in
    /// flight if there is one.
    async fn collapsed_refresh(&self) -> Result<Session, AuthError> {
        let shared = {
            let mut slot = self.refresh.lock();
            match &*slot {
                RefreshState::Pending(shared) => {
                    tracing::debug!("attaching to in-flight session refresh");
                    shared.clone()
                }
                RefreshState::Idle => {
                    tracing::debug!("starting session refresh");
                    let connector = Arc::clone(&self.connector);
                    let shared = async move {
                        connector
                            .refresh_session()
                            .await?
                            .ok_or(AuthError::RefreshUnavailable)
                    }
                    .boxed()
                    .shared();
                    *slot = RefreshState::Pending(shared.clone());
                    shared
                }
            }
        };

        let result = shared.clone().await;

        {
            let mut slot = self.refresh.lock();
            if let RefreshState::Pending(pending) = &*slot
                && pending.ptr_eq(&shared)
            {
                *slot = RefreshState::Idle;
            }
        }

        if result.is_ok() {
            self.state.set_is_signed_in(true);
        }
        result
    }

    fn cached(&self) -> Option<Session> {
        self.current.lock().clone()
    }
}

#[async_trait]
impl<C: AuthConnector + 'static> SessionManager for RefreshingSessionManager<C> {
    async fn get_session(&self, options: &GetSessionOptions) -> AuthResult<Option<Session>> {
        let mut may_retry = true;
        loop {
            let cached = self.cached();

            if let Some(session) = cached
                .as_ref()
                .filter(|session| satisfies(session.scopes(), &options.scopes))
            {
                if !self.policy.should_refresh(session) {
                    return Ok(Some(session.clone()));
                }
                return match self.collapsed_refresh().await {
                    Ok(refreshed) => {
                        // Never replace a broader session with a narrower one.
                        if satisfies(refreshed.scopes(), session.scopes()) {
                            *self.current.lock() = Some(refreshed.clone());
                        }
                        Ok(Some(refreshed))
                    }
                    Err(err) if options.optional => {
                        tracing::debug!(error = %err, "optional session refresh failed");
                        Ok(None)
                    }
                    Err(err) => Err(err),
                };
            }

            if cached.is_none() && !options.instant_popup && may_retry {
                may_retry = false;
                match self.collapsed_refresh().await {
                    Ok(refreshed) => {
                        *self.current.lock() = Some(refreshed);
                        continue;
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "silent refresh without session failed");
                    }
                }
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
            return Ok(Some(session));
        }
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
