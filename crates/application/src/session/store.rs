//! Persistent session store.
//!
//! Decorates a session manager with a storage backend. Stored sessions go
//! through the versioned persistence schema in both directions; anything
//! that fails validation is dropped rather than trusted. Storage problems
//! are logged and otherwise ignored, so a broken backend only costs the
//! caller a login prompt.

use std::sync::Arc;

use async_trait::async_trait;
use sessionkit_domain::scope::satisfies;
use sessionkit_domain::{AuthResult, PersistedSession, Session, SessionState};
use tokio::sync::watch;

use super::{GetSessionOptions, RefreshPolicy, SessionManager};
use crate::ports::KeyValueStorage;

/// Storage key used for a provider's session.
#[must_use]
pub fn storage_key_for(provider_id: &str) -> String {
    format!("{provider_id}-session")
}

/// Session manager decorator that persists sessions.
pub struct SessionStore<M> {
    manager: M,
    storage: Arc<dyn KeyValueStorage>,
    storage_key: String,
    policy: RefreshPolicy,
}

impl<M: SessionManager> SessionStore<M> {
    /// Wraps `manager`, persisting under the key for `provider_id`.
    ///
    /// `policy` decides whether a stored session is fresh enough to be used
    /// without asking the wrapped manager.
    pub fn new(
        manager: M,
        storage: Arc<dyn KeyValueStorage>,
        provider_id: &str,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            manager,
            storage,
            storage_key: storage_key_for(provider_id),
            policy,
        }
    }

    /// Storage key this store reads and writes.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// The wrapped manager.
    pub const fn inner(&self) -> &M {
        &self.manager
    }

    async fn load(&self) -> Option<Session> {
        let stored = match self.storage.get_item(&self.storage_key).await {
            Ok(stored) => stored?,
            Err(err) => {
                tracing::warn!(key = %self.storage_key, error = %err, "failed to read stored session");
                return None;
            }
        };

        match PersistedSession::decode(&stored) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(key = %self.storage_key, error = %err, "discarding invalid stored session");
                self.delete().await;
                None
            }
        }
    }

    async fn save(&self, session: Option<&Session>) {
        let Some(session) = session else {
            self.delete().await;
            return;
        };
        let encoded = match PersistedSession::encode(session) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(key = %self.storage_key, error = %err, "not persisting invalid session");
                return;
            }
        };
        if let Err(err) = self.storage.set_item(&self.storage_key, &encoded).await {
            tracing::warn!(key = %self.storage_key, error = %err, "failed to persist session");
        }
    }

    async fn delete(&self) {
        if let Err(err) = self.storage.remove_item(&self.storage_key).await {
            tracing::warn!(key = %self.storage_key, error = %err, "failed to remove stored session");
        }
    }
}

#[async_trait]
impl<M: SessionManager> SessionManager for SessionStore<M> {
    async fn get_session(&self, options: &GetSessionOptions) -> AuthResult<Option<Session>> {
        if let Some(stored) = self.load().await
            && satisfies(stored.scopes(), &options.scopes)
            && !self.policy.should_refresh(&stored)
        {
            tracing::debug!(key = %self.storage_key, "using stored session");
            self.manager.set_session(Some(stored.clone())).await;
            return Ok(Some(stored));
        }

        let session = self.manager.get_session(options).await?;
        self.save(session.as_ref()).await;
        Ok(session)
    }

    async fn set_session(&self, session: Option<Session>) {
        self.manager.set_session(session.clone()).await;
        self.save(session.as_ref()).await;
    }

    async fn remove_session(&self) -> AuthResult<()> {
        self.delete().await;
        self.manager.remove_session().await
    }

    fn session_state(&self) -> watch::Receiver<SessionState> {
        self.manager.session_state()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::session::RefreshingSessionManager;
    use crate::test_support::{FakeConnector, FakeStorage, session};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use sessionkit_domain::scope_set;
    use std::sync::atomic::Ordering;

    type Store = SessionStore<RefreshingSessionManager<FakeConnector>>;

    fn policy() -> RefreshPolicy {
        RefreshPolicy::new(|s: &Session| s.expires_within(Utc::now(), Duration::minutes(5)))
    }

    fn store(connector: FakeConnector) -> (Store, Arc<FakeConnector>, Arc<FakeStorage>) {
        let connector = Arc::new(connector);
        let storage = Arc::new(FakeStorage::default());
        let manager = RefreshingSessionManager::new(Arc::clone(&connector), scope_set(["openid"]), policy());
        let store = SessionStore::new(manager, storage.clone(), "github", policy());
        (store, connector, storage)
    }

    #[tokio::test]
    async fn test_fresh_stored_session_is_used_without_network() {
        let (store, connector, storage) = store(FakeConnector::new());
        let stored = session(&["read"], Utc::now() + Duration::hours(1));
        storage.put("github-session", &PersistedSession::encode(&stored).unwrap());

        let got = store
            .get_session(&GetSessionOptions::new(scope_set(["read"])))
            .await
            .unwrap();
        assert_eq!(got, Some(stored));
        assert_eq!(connector.refresh_calls(), 0);
        assert!(connector.created_scopes().is_empty());
        assert_eq!(*store.session_state().borrow(), SessionState::SignedIn);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_deleted_and_ignored() {
        let (store, connector, storage) = store(FakeConnector::new());
        storage.put("github-session", "{not json");

        let got = store
            .get_session(&GetSessionOptions::default().optional())
            .await
            .unwrap();
        assert_eq!(got, None);
        assert_eq!(connector.refresh_calls(), 1);
        assert_eq!(storage.get("github-session"), None);
    }

    #[tokio::test]
    async fn test_created_session_is_persisted() {
        let (store, _connector, storage) = store(FakeConnector::new());

        let created = store
            .get_session(&GetSessionOptions::new(scope_set(["read"])))
            .await
            .unwrap()
            .unwrap();

        let persisted = PersistedSession::decode(&storage.get("github-session").unwrap()).unwrap();
        assert_eq!(persisted, created);
    }

    #[tokio::test]
    async fn test_invalid_session_is_not_written() {
        let (store, _connector, storage) = store(FakeConnector::new());
        let mut invalid = session(&["read"], Utc::now() + Duration::hours(1));
        invalid.provider_info.access_token = String::new();

        store.set_session(Some(invalid)).await;
        assert_eq!(storage.get("github-session"), None);
        assert_eq!(*store.session_state().borrow(), SessionState::SignedIn);
    }

    #[tokio::test]
    async fn test_storage_failures_are_not_surfaced() {
        let (store, _connector, storage) = store(FakeConnector::new());
        storage.fail_writes.store(true, Ordering::SeqCst);

        let got = store
            .get_session(&GetSessionOptions::new(scope_set(["read"])))
            .await
            .unwrap();
        assert!(got.is_some());
        assert_eq!(storage.get("github-session"), None);
    }

    #[tokio::test]
    async fn test_remove_deletes_entry_and_signs_out() {
        let (store, connector, storage) = store(FakeConnector::new());
        store
            .set_session(Some(session(&["read"], Utc::now() + Duration::hours(1))))
            .await;
        assert!(storage.get("github-session").is_some());

        store.remove_session().await.unwrap();
        assert_eq!(storage.get("github-session"), None);
        assert_eq!(connector.remove_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*store.session_state().borrow(), SessionState::SignedOut);
    }

    #[test]
    fn test_storage_key_follows_provider() {
        assert_eq!(storage_key_for("google"), "google-session");
    }
}
