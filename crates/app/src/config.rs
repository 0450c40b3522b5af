//! Command-line configuration.
//!
//! Settings come from `SESSIONKIT_*` environment variables. When
//! `SESSIONKIT_CONFIG` names a YAML file, the provider section is read from
//! there instead of the individual provider variables.

use std::collections::HashMap;
use std::path::PathBuf;

use sessionkit_domain::{AuthError, AuthProviderInfo, ProviderConfig};

const DEFAULT_DISCOVERY_PATTERN: &str = "http://localhost:7007/api/{{pluginId}}";
const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_STATE_DIR: &str = ".sessionkit";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Provider client configuration.
    pub provider: ProviderConfig,
    /// Discovery URL pattern for backend plugins.
    pub discovery_pattern: String,
    /// Origin reported to the auth backend.
    pub app_origin: String,
    /// Directory persisted sessions are kept in.
    pub state_dir: PathBuf,
    /// Use the direct connector instead of the backend-mediated one.
    pub direct: bool,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    /// Returns a configuration error if the YAML file cannot be read or
    /// parsed, or the resulting provider configuration is invalid.
    pub async fn from_env() -> Result<Self, AuthError> {
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(key, _)| key.starts_with("SESSIONKIT_"))
            .collect();
        let yaml = match vars.get("SESSIONKIT_CONFIG") {
            Some(path) => Some(tokio::fs::read_to_string(path).await.map_err(|e| {
                AuthError::Configuration {
                    message: format!("Failed to read {path}: {e}"),
                }
            })?),
            None => None,
        };
        Self::from_vars(&vars, yaml.as_deref())
    }

    /// Builds settings from a variable map and optional YAML provider document.
    ///
    /// # Errors
    /// Returns a configuration error if the YAML is invalid or the provider
    /// configuration does not validate.
    pub fn from_vars(vars: &HashMap<String, String>, yaml: Option<&str>) -> Result<Self, AuthError> {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let provider = match yaml {
            Some(yaml) => ProviderConfig::from_yaml_str(yaml)?,
            None => {
                let id = get("SESSIONKIT_PROVIDER").unwrap_or_else(|| "github".to_string());
                let title = get("SESSIONKIT_PROVIDER_TITLE").unwrap_or_else(|| id.clone());
                let mut config = ProviderConfig::for_provider(AuthProviderInfo::new(id, title));
                if let Some(env) = get("SESSIONKIT_ENV") {
                    config = config.with_environment(env);
                }
                if let Some(scopes) = get("SESSIONKIT_SCOPES") {
                    config = config.with_default_scopes(
                        sessionkit_domain::scope::normalize_scopes(&scopes),
                    );
                }
                config
            }
        };
        provider.validate()?;

        Ok(Self {
            provider,
            discovery_pattern: get("SESSIONKIT_DISCOVERY_URL")
                .unwrap_or_else(|| DEFAULT_DISCOVERY_PATTERN.to_string()),
            app_origin: get("SESSIONKIT_APP_ORIGIN")
                .unwrap_or_else(|| DEFAULT_APP_ORIGIN.to_string()),
            state_dir: get("SESSIONKIT_STATE_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from),
            direct: get("SESSIONKIT_DIRECT").is_some_and(|v| v == "1" || v == "true"),
        })
    }
}
