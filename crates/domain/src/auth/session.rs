//! Session snapshot types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::scope::ScopeSet;

/// Identifies one auth provider (for example `github` or `google`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthProviderInfo {
    /// Provider identifier, used in backend URLs and storage keys.
    pub id: String,
    /// Human readable title, used for the popup window name.
    pub title: String,
    /// Optional icon reference for login prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl AuthProviderInfo {
    /// Creates provider info without an icon.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            icon: None,
        }
    }
}

/// Credentials issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Access token for calling the provider's APIs.
    pub access_token: String,
    /// `OpenID` Connect id token, when the provider issues one.
    pub id_token: Option<String>,
    /// Scopes granted to the access token.
    pub scopes: ScopeSet,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
}

/// Profile of the signed in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// Ownership claims carried by a platform identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    /// Entity reference of the signed in user.
    pub user_entity_ref: String,
    /// Entity references the user owns or is a member of.
    #[serde(default)]
    pub ownership_entity_refs: Vec<String>,
}

/// Platform identity issued by the backend alongside provider credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInIdentity {
    /// Platform token.
    pub token: String,
    /// When the platform token expires, if it does.
    pub expires_at: Option<DateTime<Utc>>,
    /// Resolved identity claims.
    pub identity: Option<IdentityClaims>,
}

/// An immutable credential bundle.
///
/// Sessions are replaced wholesale; nothing in this crate mutates a session
/// after it has been handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Provider credentials.
    pub provider_info: ProviderInfo,
    /// Platform identity, when the backend issued one.
    pub identity: Option<SignInIdentity>,
    /// User profile.
    pub profile: ProfileInfo,
}

impl Session {
    /// Scopes granted to this session.
    #[must_use]
    pub const fn scopes(&self) -> &ScopeSet {
        &self.provider_info.scopes
    }

    /// Earliest expiry across provider credentials and platform identity.
    #[must_use]
    pub fn earliest_expiry(&self) -> DateTime<Utc> {
        let provider = self.provider_info.expires_at;
        self.identity
            .as_ref()
            .and_then(|identity| identity.expires_at)
            .map_or(provider, |identity| identity.min(provider))
    }

    /// Returns true if any credential expires within `window` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.earliest_expiry() - now < window
    }
}

/// Signed-in state of one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// A session is available.
    SignedIn,
    /// No session is available.
    #[default]
    SignedOut,
}

impl SessionState {
    /// Maps a boolean signed-in flag to a state.
    #[must_use]
    pub const fn from_signed_in(signed_in: bool) -> Self {
        if signed_in {
            Self::SignedIn
        } else {
            Self::SignedOut
        }
    }

    /// Returns true for [`SessionState::SignedIn`].
    #[must_use]
    pub const fn is_signed_in(self) -> bool {
        matches!(self, Self::SignedIn)
    }
}
