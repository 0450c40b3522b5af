//! Persisted projection of a [`Session`].
//!
//! Stored format (schema version 1):
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "providerInfo": {
//!     "accessToken": "gho_abc",
//!     "idToken": null,
//!     "scopes": { "kind": "set", "values": ["read:user", "repo"] },
//!     "expiresAt": "2026-01-01T00:00:00Z"
//!   },
//!   "profile": { "email": "jane@example.com" },
//!   "identity": null
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{CURRENT_SCHEMA_VERSION, TaggedSet};
use crate::auth::{IdentityClaims, ProfileInfo, ProviderInfo, Session, SignInIdentity};
use crate::error::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PersistedProviderInfo {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
    scopes: TaggedSet,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PersistedIdentity {
    token: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    identity: Option<IdentityClaims>,
}

/// Versioned, schema-checked form of a session for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersistedSession {
    schema_version: u32,
    provider_info: PersistedProviderInfo,
    #[serde(default)]
    profile: ProfileInfo,
    #[serde(default)]
    identity: Option<PersistedIdentity>,
}

impl PersistedSession {
    /// Projects a session into its stored form.
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let provider = &session.provider_info;
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            provider_info: PersistedProviderInfo {
                access_token: provider.access_token.clone(),
                id_token: provider.id_token.clone(),
                scopes: TaggedSet(provider.scopes.clone()),
                expires_at: provider.expires_at,
            },
            profile: session.profile.clone(),
            identity: session.identity.as_ref().map(|identity| PersistedIdentity {
                token: identity.token.clone(),
                expires_at: identity.expires_at,
                identity: identity.identity.clone(),
            }),
        }
    }

    /// Rebuilds the in-memory session.
    #[must_use]
    pub fn into_session(self) -> Session {
        let provider = self.provider_info;
        Session {
            provider_info: ProviderInfo {
                access_token: provider.access_token,
                id_token: provider.id_token,
                scopes: provider.scopes.0,
                expires_at: provider.expires_at,
            },
            identity: self.identity.map(|identity| SignInIdentity {
                token: identity.token,
                expires_at: identity.expires_at,
                identity: identity.identity,
            }),
            profile: self.profile,
        }
    }

    /// Checks the constraints the type system does not express.
    ///
    /// # Errors
    ///
    /// Returns the first constraint violation found.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedVersion {
                found: self.schema_version,
                expected: CURRENT_SCHEMA_VERSION,
            });
        }
        if self.provider_info.access_token.is_empty() {
            return Err(SchemaError::InvalidField {
                field: "providerInfo.accessToken",
                reason: "must not be empty",
            });
        }
        if self.provider_info.scopes.0.iter().any(String::is_empty) {
            return Err(SchemaError::InvalidField {
                field: "providerInfo.scopes",
                reason: "scope identifiers must not be empty",
            });
        }
        if let Some(identity) = &self.identity
            && identity.token.is_empty()
        {
            return Err(SchemaError::InvalidField {
                field: "identity.token",
                reason: "must not be empty",
            });
        }
        Ok(())
    }

    /// Validates and encodes a session for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the session violates the schema.
    pub fn encode(session: &Session) -> Result<String, SchemaError> {
        let persisted = Self::from_session(session);
        persisted.validate()?;
        serde_json::to_string(&persisted).map_err(|e| SchemaError::Malformed(e.to_string()))
    }

    /// Decodes and validates a stored entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON for the schema or
    /// violates one of its constraints.
    pub fn decode(stored: &str) -> Result<Session, SchemaError> {
        let persisted: Self =
            serde_json::from_str(stored).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        persisted.validate()?;
        Ok(persisted.into_session())
    }
}
