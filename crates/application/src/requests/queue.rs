//! Pending-request queue.
//!
//! Holds every caller that is waiting for an interactive login on one
//! provider handler. The queue itself is plain data; the request manager
//! owns the lock around it and publishes the aggregate after each change.

use sessionkit_domain::{AuthError, ScopeSet, scope::satisfies};
use tokio::sync::oneshot;

/// Receives the outcome of one queued request.
pub type PendingReceiver<T> = oneshot::Receiver<Result<T, AuthError>>;

struct PendingEntry<T> {
    scopes: ScopeSet,
    sender: oneshot::Sender<Result<T, AuthError>>,
}

/// Queue of outstanding scope demands for one handler.
pub struct PendingRequestQueue<T> {
    entries: Vec<PendingEntry<T>>,
}

impl<T: Clone> PendingRequestQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Enqueues a demand and returns where its outcome will be delivered.
    pub fn push(&mut self, scopes: ScopeSet) -> PendingReceiver<T> {
        let (sender, receiver) = oneshot::channel();
        self.entries.push(PendingEntry { scopes, sender });
        receiver
    }

    /// Union of all queued scopes, or `None` when nothing is queued.
    #[must_use]
    pub fn aggregate(&self) -> Option<ScopeSet> {
        if self.entries.is_empty() {
            return None;
        }
        Some(
            self.entries
                .iter()
                .flat_map(|entry| entry.scopes.iter().cloned())
                .collect(),
        )
    }

    /// Fulfils every request covered by `granted` with `result`.
    ///
    /// Requests asking for more than was granted stay queued.
    ///
    /// # Returns
    /// The number of requests fulfilled.
    pub fn resolve(&mut self, granted: &ScopeSet, result: &T) -> usize {
        let (covered, remaining): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|entry| satisfies(granted, &entry.scopes));
        self.entries = remaining;

        let fulfilled = covered.len();
        for entry in covered {
            // The caller may have stopped waiting; that is not our problem.
            let _ = entry.sender.send(Ok(result.clone()));
        }
        fulfilled
    }

    /// Fails every queued request with `error` and empties the queue.
    ///
    /// # Returns
    /// The number of requests rejected.
    pub fn reject(&mut self, error: &AuthError) -> usize {
        let rejected = self.entries.len();
        for entry in self.entries.drain(..) {
            let _ = entry.sender.send(Err(error.clone()));
        }
        rejected
    }

    /// Number of queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for PendingRequestQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
