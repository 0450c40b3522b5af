//! Sessionkit Application - Session coordination
//!
//! This crate holds the coordination logic of the credential coordinator:
//! the ports it needs from its environment, the login popup handshake,
//! request collapsing across concurrent callers, and the session managers
//! that decide when to create, refresh, persist or drop a session.

pub mod auth;
pub mod client;
pub mod ports;
pub mod requests;
pub mod session;

#[cfg(test)]
mod test_support;

pub use auth::{AuthConnector, CreateSessionOptions, LoginPopupOptions, show_login_popup};
pub use client::{AuthRequestOptions, OAuth2Client};
pub use requests::{AuthRequester, OAuthRequestManager, PendingAuthRequest};
pub use session::{
    GetSessionOptions, RefreshPolicy, RefreshingSessionManager, SessionManager, SessionStore,
    StaticSessionManager,
};
