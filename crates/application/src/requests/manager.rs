//! Request manager.
//!
//! Collapses concurrent interactive-login demands. Each requester owns a
//! queue and a handler slot; whenever a queue changes, the manager installs
//! or clears that slot and republishes the list of active handlers, which a
//! login prompt uses to show "N providers awaiting login".

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use sessionkit_domain::{AuthError, AuthProviderInfo, ScopeSet};
use tokio::sync::broadcast;

use super::queue::PendingRequestQueue;

/// Default buffer size for the pending-request channel.
/// Lists beyond this limit are dropped for slow receivers.
const DEFAULT_BUFFER_SIZE: usize = 64;

type AuthRequestHandler<T> = Box<dyn Fn(ScopeSet) -> BoxFuture<'static, Result<T, AuthError>> + Send + Sync>;

#[async_trait]
trait AggregateHandle: Send + Sync {
    async fn trigger(&self, scopes: ScopeSet) -> Result<(), AuthError>;
    fn reject(&self);
}

/// An aggregate login demand waiting for the user.
#[derive(Clone)]
pub struct PendingAuthRequest {
    provider: AuthProviderInfo,
    scopes: ScopeSet,
    handle: Arc<dyn AggregateHandle>,
}

impl PendingAuthRequest {
    /// Provider the demand is for.
    #[must_use]
    pub const fn provider(&self) -> &AuthProviderInfo {
        &self.provider
    }

    /// Union of the scopes of every caller waiting on this provider.
    #[must_use]
    pub const fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    /// Runs the interactive login for the aggregate scopes.
    ///
    /// Callers covered by the result are fulfilled; callers that asked for
    /// scopes added after this aggregate was published stay queued.
    ///
    /// # Errors
    /// Returns the login error; the queue is left untouched in that case.
    pub async fn trigger(&self) -> Result<(), AuthError> {
        self.handle.trigger(self.scopes.clone()).await
    }

    /// Fails every caller waiting on this provider with `RejectedError`.
    pub fn reject(&self) {
        self.handle.reject();
    }
}

impl fmt::Debug for PendingAuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAuthRequest")
            .field("provider", &self.provider.id)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// Active requests keyed by handler slot, in requester creation order.
#[derive(Default)]
struct Slots {
    next: usize,
    active: BTreeMap<usize, PendingAuthRequest>,
}

impl Slots {
    fn snapshot(&self) -> Vec<PendingAuthRequest> {
        self.active.values().cloned().collect()
    }
}

struct ManagerShared {
    slots: Mutex<Slots>,
    sender: broadcast::Sender<Vec<PendingAuthRequest>>,
}

impl ManagerShared {
    fn publish(&self, slot: usize, request: Option<PendingAuthRequest>) {
        let active: Vec<PendingAuthRequest> = {
            let mut slots = self.slots.lock();
            match request {
                Some(request) => {
                    slots.active.insert(slot, request);
                }
                None => {
                    slots.active.remove(&slot);
                }
            }
            slots.snapshot()
        };
        tracing::debug!(active = active.len(), "pending auth requests changed");
        let _ = self.sender.send(active);
    }
}

struct RequesterCore<T> {
    provider: AuthProviderInfo,
    slot: usize,
    manager: Arc<ManagerShared>,
    on_auth_request: AuthRequestHandler<T>,
    queue: Mutex<PendingRequestQueue<T>>,
    this: Weak<Self>,
}

impl<T: Clone + Send + Sync + 'static> RequesterCore<T> {
    /// Must be called with the queue lock held so publications stay ordered.
    fn publish(&self, queue: &PendingRequestQueue<T>) {
        let request = queue.aggregate().map(|scopes| PendingAuthRequest {
            provider: self.provider.clone(),
            scopes,
            handle: Arc::new(RequestHandle {
                core: self.this.clone(),
            }),
        });
        self.manager.publish(self.slot, request);
    }

    fn resolve(&self, scopes: &ScopeSet, result: &T) {
        let mut queue = self.queue.lock();
        let fulfilled = queue.resolve(scopes, result);
        tracing::debug!(provider = %self.provider.id, fulfilled, remaining = queue.len(), "auth request resolved");
        self.publish(&queue);
    }

    fn reject(&self) {
        let mut queue = self.queue.lock();
        let rejected = queue.reject(&AuthError::Rejected);
        tracing::debug!(provider = %self.provider.id, rejected, "auth requests rejected");
        self.publish(&queue);
    }
}

impl<T> Drop for RequesterCore<T> {
    fn drop(&mut self) {
        self.manager.publish(self.slot, None);
    }
}

struct RequestHandle<T> {
    core: Weak<RequesterCore<T>>,
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> AggregateHandle for RequestHandle<T> {
    async fn trigger(&self, scopes: ScopeSet) -> Result<(), AuthError> {
        let core = self.core.upgrade().ok_or(AuthError::Rejected)?;
        let result = (core.on_auth_request)(scopes.clone()).await?;
        core.resolve(&scopes, &result);
        Ok(())
    }

    fn reject(&self) {
        if let Some(core) = self.core.upgrade() {
            core.reject();
        }
    }
}

/// Queues scope demands for one provider handler.
pub struct AuthRequester<T> {
    core: Arc<RequesterCore<T>>,
}

impl<T> Clone for AuthRequester<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> AuthRequester<T> {
    /// Queues a demand for `scopes`.
    ///
    /// The demand is queued when this method is called, not when the returned
    /// future is first polled, so demands made back to back always end up in
    /// the same aggregate.
    pub fn request(&self, scopes: ScopeSet) -> BoxFuture<'static, Result<T, AuthError>> {
        let receiver = {
            let mut queue = self.core.queue.lock();
            let receiver = queue.push(scopes);
            self.core.publish(&queue);
            receiver
        };
        async move { receiver.await.unwrap_or_else(|_| Err(AuthError::Rejected)) }.boxed()
    }

    /// Number of callers currently waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.core.queue.lock().len()
    }
}

impl<T> fmt::Debug for AuthRequester<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequester")
            .field("provider", &self.core.provider.id)
            .field("slot", &self.core.slot)
            .finish()
    }
}

/// Coordinates interactive login demands across providers.
///
/// Cloning is cheap; clones share the same handler slots.
#[derive(Clone)]
pub struct OAuthRequestManager {
    shared: Arc<ManagerShared>,
}

impl OAuthRequestManager {
    /// Creates a manager with the default channel buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Creates a manager with a custom channel buffer.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            shared: Arc::new(ManagerShared {
                slots: Mutex::new(Slots::default()),
                sender,
            }),
        }
    }

    /// Creates a requester bound to a fresh handler slot.
    ///
    /// `on_auth_request` runs the interactive login when a pending request
    /// is triggered.
    pub fn create_auth_requester<T, F, Fut>(
        &self,
        provider: AuthProviderInfo,
        on_auth_request: F,
    ) -> AuthRequester<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(ScopeSet) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, AuthError>> + Send + 'static,
    {
        let slot = {
            let mut slots = self.shared.slots.lock();
            slots.next += 1;
            slots.next - 1
        };
        let manager = Arc::clone(&self.shared);
        let core = Arc::new_cyclic(|this| RequesterCore {
            provider,
            slot,
            manager,
            on_auth_request: Box::new(move |scopes| on_auth_request(scopes).boxed()),
            queue: Mutex::new(PendingRequestQueue::new()),
            this: this.clone(),
        });
        AuthRequester { core }
    }

    /// Subscribes to changes of the active request list.
    ///
    /// Only changes made after subscribing are received; use
    /// [`Self::pending_requests`] for the current list.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<PendingAuthRequest>> {
        self.shared.sender.subscribe()
    }

    /// Current list of active requests, one per provider handler.
    #[must_use]
    pub fn pending_requests(&self) -> Vec<PendingAuthRequest> {
        self.shared.slots.lock().snapshot()
    }
}

impl Default for OAuthRequestManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OAuthRequestManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthRequestManager")
            .field("active", &self.shared.slots.lock().active.len())
            .field("subscriber_count", &self.shared.sender.receiver_count())
            .finish()
    }
}
