//! URL pattern discovery adapter

use async_trait::async_trait;
use sessionkit_application::ports::DiscoveryApi;
use sessionkit_domain::AuthError;

/// Placeholder replaced with the plugin id.
const PLUGIN_ID_PLACEHOLDER: &str = "{{pluginId}}";

/// Discovery that expands a fixed URL pattern.
///
/// `http://localhost:7007/api/{{pluginId}}` resolves the `auth` plugin to
/// `http://localhost:7007/api/auth`.
#[derive(Debug, Clone)]
pub struct UrlPatternDiscovery {
    pattern: String,
}

impl UrlPatternDiscovery {
    /// Creates a discovery from `pattern`.
    ///
    /// # Errors
    /// Returns a configuration error if `pattern` is not an absolute URL
    /// once the placeholder is filled in.
    pub fn compile(pattern: impl Into<String>) -> Result<Self, AuthError> {
        let pattern = pattern.into();
        let probe = pattern.replace(PLUGIN_ID_PLACEHOLDER, "plugin");
        let parsed = url::Url::parse(&probe).map_err(|e| AuthError::Configuration {
            message: format!("Invalid discovery pattern '{pattern}': {e}"),
        })?;
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(AuthError::Configuration {
                message: format!("Discovery pattern '{pattern}' must not have a query or fragment"),
            });
        }
        Ok(Self { pattern })
    }

    /// The pattern as given.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[async_trait]
impl DiscoveryApi for UrlPatternDiscovery {
    async fn get_base_url(&self, plugin_id: &str) -> Result<String, AuthError> {
        let url = self.pattern.replace(PLUGIN_ID_PLACEHOLDER, plugin_id);
        Ok(url.trim_end_matches('/').to_string())
    }
}
