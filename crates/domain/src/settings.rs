//! Provider configuration.
//!
//! Every field has a default so a minimal document only needs the provider:
//! ```yaml
//! provider:
//!   id: github
//!   title: GitHub
//! defaultScopes: [read:user]
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthProviderInfo, ScopeSet};
use crate::error::AuthError;

/// Popup size used by connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for PopupSize {
    fn default() -> Self {
        Self {
            width: 450,
            height: 730,
        }
    }
}

/// Configuration of one auth provider client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Provider identity.
    pub provider: AuthProviderInfo,
    /// Backend environment passed as `env` on every request.
    pub environment: String,
    /// Scopes added to every session request.
    pub default_scopes: Vec<String>,
    /// Popup window size.
    pub popup: PopupSize,
    /// Plugin id resolved through discovery to find the auth backend.
    pub discovery_plugin_id: String,
    /// Sessions expiring within this many seconds are refreshed.
    pub refresh_window_seconds: i64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: AuthProviderInfo::new("oauth2", "Your Identity Provider"),
            environment: "development".to_string(),
            default_scopes: Vec::new(),
            popup: PopupSize::default(),
            discovery_plugin_id: "auth".to_string(),
            refresh_window_seconds: 300,
        }
    }
}

impl ProviderConfig {
    /// Creates a configuration for the given provider with defaults elsewhere.
    #[must_use]
    pub fn for_provider(provider: AuthProviderInfo) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Sets the default scopes.
    #[must_use]
    pub fn with_default_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the backend environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Default scopes as a set.
    #[must_use]
    pub fn default_scope_set(&self) -> ScopeSet {
        self.default_scopes.iter().cloned().collect()
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the document is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AuthError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| AuthError::Configuration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] describing the first problem.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.provider.id.trim().is_empty() {
            return Err(AuthError::Configuration {
                message: "provider.id must not be empty".to_string(),
            });
        }
        self.refresh_window().map(|_| ())
    }

    /// Refresh window as a duration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the window is negative or too
    /// large to represent.
    pub fn refresh_window(&self) -> Result<Duration, AuthError> {
        if self.refresh_window_seconds < 0 {
            return Err(AuthError::Configuration {
                message: "refreshWindowSeconds must not be negative".to_string(),
            });
        }
        Duration::try_seconds(self.refresh_window_seconds).ok_or_else(|| AuthError::Configuration {
            message: format!(
                "refreshWindowSeconds {} is out of range",
                self.refresh_window_seconds
            ),
        })
    }
}
