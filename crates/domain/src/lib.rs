//! Sessionkit Domain - Core session types
//!
//! This crate defines the domain model for the Sessionkit credential
//! coordinator: sessions, scope set logic, the persisted session schema,
//! popup wire messages and provider configuration.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod persistence;
pub mod popup;
pub mod settings;

pub use auth::scope;
pub use auth::{
    AuthProviderInfo, ErrorPayload, IdentityClaims, ProfileInfo, ProviderInfo, ScopeSet, Session,
    SessionPayload, SessionState, SignInIdentity, scope_set,
};
pub use error::{AuthError, AuthResult, SchemaError};
pub use persistence::{CURRENT_SCHEMA_VERSION, PersistedSession, TaggedSet};
pub use popup::{PopupGeometry, PopupMessage};
pub use settings::{PopupSize, ProviderConfig};
