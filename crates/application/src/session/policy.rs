//! Refresh policy.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use sessionkit_domain::Session;

use crate::ports::Clock;

/// Default refresh window: sessions expiring within five minutes are refreshed.
pub const DEFAULT_REFRESH_WINDOW_SECONDS: i64 = 5 * 60;

type RefreshPredicate = dyn Fn(&Session) -> bool + Send + Sync;

/// Decides whether a cached session should be refreshed before use.
#[derive(Clone)]
pub struct RefreshPolicy {
    predicate: Arc<RefreshPredicate>,
}

impl RefreshPolicy {
    /// Wraps an arbitrary predicate.
    pub fn new(predicate: impl Fn(&Session) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Never refresh.
    #[must_use]
    pub fn never() -> Self {
        Self::new(|_| false)
    }

    /// Refresh when provider or identity expiry falls within `window` of the
    /// clock's current time.
    #[must_use]
    pub fn expires_within(clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self::new(move |session| session.expires_within(clock.now(), window))
    }

    /// [`Self::expires_within`] with the default five minute window.
    #[must_use]
    pub fn with_default_window(clock: Arc<dyn Clock>) -> Self {
        Self::expires_within(clock, Duration::seconds(DEFAULT_REFRESH_WINDOW_SECONDS))
    }

    /// Returns true if `session` should be refreshed.
    #[must_use]
    pub fn should_refresh(&self, session: &Session) -> bool {
        (self.predicate)(session)
    }
}

impl fmt::Debug for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshPolicy").finish_non_exhaustive()
    }
}
