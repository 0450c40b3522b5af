//! Authentication flows.
//!
//! This module provides:
//! - The connector trait session managers create, refresh and remove
//!   sessions through
//! - The interactive login popup handshake

mod connector;
mod popup;

pub use connector::{AuthConnector, CreateSessionOptions};
pub use popup::{LoginPopupOptions, POPUP_POLL_INTERVAL, show_login_popup, show_login_popup_until};
