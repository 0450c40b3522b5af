//! Discovery port

use async_trait::async_trait;
use sessionkit_domain::AuthError;

/// Resolves the base URL of a backend plugin, for example `auth`.
#[async_trait]
pub trait DiscoveryApi: Send + Sync {
    /// Returns the base URL for `plugin_id`, without a trailing slash.
    ///
    /// # Errors
    /// Returns an error if the plugin cannot be located.
    async fn get_base_url(&self, plugin_id: &str) -> Result<String, AuthError>;
}
