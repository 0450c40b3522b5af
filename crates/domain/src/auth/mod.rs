//! Authentication domain types

mod payload;
pub mod scope;
mod session;

pub use payload::{ErrorPayload, IdentityPayload, ProviderInfoPayload, SessionPayload};
pub use scope::{ScopeSet, scope_set};
pub use session::{
    AuthProviderInfo, IdentityClaims, ProfileInfo, ProviderInfo, Session, SessionState,
    SignInIdentity,
};
