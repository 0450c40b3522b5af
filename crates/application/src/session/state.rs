//! Signed-in state tracking.

use sessionkit_domain::SessionState;
use tokio::sync::watch;

/// Latest-value broadcaster for a provider's signed-in state.
///
/// New subscribers see the current state immediately. Setting the state to
/// the value it already has notifies nobody.
#[derive(Debug)]
pub struct SessionStateTracker {
    sender: watch::Sender<SessionState>,
}

impl SessionStateTracker {
    /// Creates a tracker starting signed out.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SessionState::SignedOut);
        Self { sender }
    }

    /// Records the signed-in flag.
    ///
    /// # Returns
    /// True if the state changed and subscribers were notified.
    pub fn set_is_signed_in(&self, signed_in: bool) -> bool {
        let next = SessionState::from_signed_in(signed_in);
        let changed = self.sender.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        if changed {
            tracing::info!(state = ?next, "session state changed");
        }
        changed
    }

    /// Subscribes to state changes, starting from the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.sender.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        *self.sender.borrow()
    }
}

impl Default for SessionStateTracker {
    fn default() -> Self {
        Self::new()
    }
}
