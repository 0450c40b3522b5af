//! Domain error types

use thiserror::Error;

/// Errors produced while obtaining, refreshing or removing a session.
///
/// The type is `Clone` because a single refresh result is fanned out to
/// every caller that attached to it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The host refused to open the login popup.
    #[error("{message}")]
    PopupRejected {
        /// Error description.
        message: String,
    },

    /// The user closed the popup before the handshake completed.
    #[error("{message}")]
    PopupClosed {
        /// Error description, including an origin hint when one was observed.
        message: String,
        /// Origin the provider announced via `config_info`, when it differs
        /// from the page origin.
        expected_origin: Option<String>,
    },

    /// Pending requests were explicitly rejected.
    #[error("Login failed, rejected by user")]
    Rejected,

    /// A named error forwarded verbatim from the provider or backend.
    #[error("{name}: {message}")]
    Provider {
        /// Error name supplied by the provider.
        name: String,
        /// Error message supplied by the provider.
        message: String,
    },

    /// A request to the auth backend failed.
    #[error("{message}")]
    Network {
        /// Error description.
        message: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
    },

    /// The backend answered with a payload that could not be understood.
    #[error("invalid auth response: {message}")]
    InvalidResponse {
        /// Error description.
        message: String,
    },

    /// The connector has no way to refresh a session silently.
    #[error("session refresh is not available")]
    RefreshUnavailable,

    /// The coordinator was wired with an unusable configuration.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Error description.
        message: String,
    },
}

impl AuthError {
    /// Stable error name, matching the names surfaced to UI code.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::PopupRejected { .. } => "PopupRejectedError",
            Self::PopupClosed { .. } => "PopupClosedError",
            Self::Rejected => "RejectedError",
            Self::Provider { name, .. } => name,
            Self::Network { .. } => "NetworkError",
            Self::InvalidResponse { .. } => "InvalidResponseError",
            Self::RefreshUnavailable => "RefreshUnavailableError",
            Self::Configuration { .. } => "ConfigurationError",
        }
    }

    /// HTTP status attached to the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true for errors raised by the interactive popup itself.
    ///
    /// Callers use this to tell an abandoned prompt apart from a failed
    /// silent refresh.
    #[must_use]
    pub const fn is_popup_error(&self) -> bool {
        matches!(self, Self::PopupRejected { .. } | Self::PopupClosed { .. })
    }
}

/// Errors raised when a persisted session does not match the declared schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The stored text is not valid JSON for the schema.
    #[error("malformed session data: {0}")]
    Malformed(String),

    /// The stored entry was written with a different schema version.
    #[error("unsupported schema version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version found in the entry.
        found: u32,
        /// Version this build reads and writes.
        expected: u32,
    },

    /// A field is present but violates a constraint.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Dotted path of the field.
        field: &'static str,
        /// Constraint that failed.
        reason: &'static str,
    },
}

/// Result type alias for session operations.
pub type AuthResult<T> = Result<T, AuthError>;
