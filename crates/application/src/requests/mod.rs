//! Request coordination.
//!
//! Many independent callers may need an interactive login for the same
//! provider at the same time. This module merges their demands so the user
//! sees one prompt per provider, asking for the union of everything needed.

mod manager;
mod queue;

pub use manager::{AuthRequester, OAuthRequestManager, PendingAuthRequest};
pub use queue::{PendingReceiver, PendingRequestQueue};
