//! CLI configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use scout_search::SearchConfig;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "SCOUT_API_URL";

/// Config file names searched for, in order.
pub const CONFIG_NAMES: [&str; 3] = ["scout.toml", ".scout.toml", "scout.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Storefront API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Search core tunables.
    #[serde(default)]
    pub search: SearchConfig,

    /// Local storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        self
    }
}

/// Storefront API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the search endpoint is resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt request timeout; dependency defaults apply when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: None,
        }
    }
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding persisted client state (recent searches).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

/// Generate a default config file.
pub fn generate_default_config(base_url: &str) -> String {
    format!(
        r#"# Scout configuration

[api]
base_url = "{base_url}"
# timeout_ms = 5000

[search]
endpoint = "/api/search"
search_debounce_ms = 300
filter_debounce_ms = 150
slider_debounce_ms = 300
suggest_debounce_ms = 300
settle_ms = 50
recent_capacity = 10
recent_key = "recentSearches"

[search.default_price_range]
min = 50.0
max = 500.0

[storage]
# path = ".scout"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: CliConfig = toml::from_str(&generate_default_config("https://shop.test")).unwrap();
        assert_eq!(config.api.base_url, "https://shop.test");
        assert_eq!(config.api.timeout_ms, None);
        assert_eq!(config.search, SearchConfig::default());
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config: CliConfig = toml::from_str(
            r#"
[api]
timeout_ms = 1500

[search]
filter_debounce_ms = 50
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.timeout_ms, Some(1500));
        assert_eq!(config.search.filter_debounce_ms, 50);
        assert_eq!(config.search.search_debounce_ms, 300);
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.json");
        let path = path.to_str().unwrap();

        let mut config = CliConfig::default();
        config.storage.path = Some(PathBuf::from("/tmp/scout"));
        config.save(path).unwrap();

        let loaded = CliConfig::load(path).unwrap();
        assert_eq!(loaded.storage.path, Some(PathBuf::from("/tmp/scout")));
        assert_eq!(loaded.search, config.search);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = CliConfig::load("/definitely/missing/scout.toml").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
