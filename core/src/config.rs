//! Client configuration.
//!
//! Every field has a default so a partial config (or none at all) is valid.
//! `from_env` overlays the two values that differ per deployment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const ENV_BASE_URL: &str = "CRM_API_BASE_URL";
pub const ENV_STORAGE_PATH: &str = "CRM_STORAGE_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root every endpoint is appended to.
    pub base_url: String,
    /// Store key of the bearer token.
    pub token_key: String,
    /// Store key of the current user.
    pub user_key: String,
    /// A route containing this marker is treated as the login view.
    pub login_route: String,
    /// Backing file of `FileStore`.
    pub storage_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            token_key: "authToken".to_string(),
            user_key: "currentUser".to_string(),
            login_route: "login".to_string(),
            storage_path: default_storage_path(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Ok(path) = std::env::var(ENV_STORAGE_PATH) {
            config.storage_path = PathBuf::from(path);
        }
        config
    }

    /// `base_url` without trailing slashes.
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("crm-client")
        .join("storage.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_browser_client_keys() {
        let config = ClientConfig::default();
        assert_eq!(config.token_key, "authToken");
        assert_eq!(config.user_key, "currentUser");
        assert_eq!(config.login_route, "login");
        assert!(config.storage_path.ends_with("crm-client/storage.json"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"https://crm.example.com/api/"}"#).unwrap();
        assert_eq!(config.api_root(), "https://crm.example.com/api");
        assert_eq!(config.token_key, "authToken");
    }
}
