//! Wire form of the session payload returned by the auth backend.
//!
//! The same payload arrives through two routes: as the body of a `/refresh`
//! response and embedded in the popup's `authorization_response` message.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::scope::normalize_scopes;
use super::session::{IdentityClaims, ProfileInfo, ProviderInfo, Session, SignInIdentity};
use crate::error::AuthError;

/// Provider credentials as sent by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfoPayload {
    /// Access token.
    pub access_token: String,
    /// Id token, if issued.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Granted scopes as a single space or comma separated string.
    #[serde(default)]
    pub scope: String,
    /// Lifetime of the access token, relative to receipt.
    pub expires_in_seconds: i64,
}

/// Platform identity as sent by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPayload {
    /// Platform token.
    pub token: String,
    /// Lifetime of the platform token, relative to receipt.
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
    /// Resolved identity claims.
    #[serde(default)]
    pub identity: Option<IdentityClaims>,
}

/// Session payload as sent by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// Provider credentials.
    pub provider_info: ProviderInfoPayload,
    /// User profile.
    #[serde(default)]
    pub profile: ProfileInfo,
    /// Platform identity.
    #[serde(default, alias = "backstageIdentity")]
    pub identity: Option<IdentityPayload>,
}

/// Error object embedded in backend or popup responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    /// Error name, forwarded as the error's name.
    #[serde(default = "default_error_name")]
    pub name: String,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
}

fn default_error_name() -> String {
    "Error".to_string()
}

impl From<ErrorPayload> for AuthError {
    fn from(payload: ErrorPayload) -> Self {
        Self::Provider {
            name: payload.name,
            message: payload.message,
        }
    }
}

impl SessionPayload {
    /// Parses a payload out of an arbitrary JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidResponse`] if the value does not have the
    /// expected shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AuthError> {
        serde_json::from_value(value).map_err(|e| AuthError::InvalidResponse {
            message: e.to_string(),
        })
    }

    /// Converts the payload into a session, anchoring relative expiries at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidResponse`] if an expiry does not fit in a
    /// timestamp.
    pub fn into_session(self, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let provider = self.provider_info;
        let identity = match self.identity {
            Some(identity) => Some(SignInIdentity {
                expires_at: identity
                    .expires_in_seconds
                    .map(|secs| expiry_after(now, secs))
                    .transpose()?,
                token: identity.token,
                identity: identity.identity,
            }),
            None => None,
        };

        Ok(Session {
            provider_info: ProviderInfo {
                expires_at: expiry_after(now, provider.expires_in_seconds)?,
                access_token: provider.access_token,
                id_token: provider.id_token,
                scopes: normalize_scopes(&provider.scope),
            },
            identity,
            profile: self.profile,
        })
    }
}

fn expiry_after(now: DateTime<Utc>, seconds: i64) -> Result<DateTime<Utc>, AuthError> {
    Duration::try_seconds(seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| AuthError::InvalidResponse {
            message: format!("expiresInSeconds {seconds} is out of range"),
        })
}
