//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use scout_cache::{Cache, FileStore};
use scout_data::FetchClient;
use scout_search::{HttpSearchApi, RecentSearches, SearchApi, SuggestionFetcher};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Config file the configuration came from, if any.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config: config.with_env(),
            output,
            cwd,
            config_path,
        })
    }

    /// Search endpoint client for the configured storefront.
    pub fn api(&self) -> Result<Arc<dyn SearchApi>> {
        let client = FetchClient::new()
            .context("Failed to create HTTP client")?
            .with_base_url(self.config.api.base_url.as_str());
        let mut api = HttpSearchApi::new(client, self.config.search.endpoint.as_str());
        if let Some(ms) = self.config.api.timeout_ms {
            api = api.with_timeout(Duration::from_millis(ms));
        }
        self.output.debug(&format!(
            "Using {}{}",
            self.config.api.base_url,
            api.endpoint()
        ));
        Ok(Arc::new(api))
    }

    pub fn fetcher(&self) -> Result<SuggestionFetcher> {
        Ok(SuggestionFetcher::new(self.api()?))
    }

    /// Recent-search list backed by the storage directory.
    pub fn recent(&self) -> Result<RecentSearches> {
        let dir = self.storage_dir();
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open storage directory: {}", dir.display()))?;
        Ok(RecentSearches::load_with(
            Cache::new(Arc::new(store)),
            self.config.search.recent_key.as_str(),
            self.config.search.recent_capacity,
        ))
    }

    /// Directory holding persisted client state.
    pub fn storage_dir(&self) -> PathBuf {
        match &self.config.storage.path {
            Some(path) => self.resolve_path(path),
            None => data_dir().join("scout"),
        }
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find config file in directory tree.
fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                match CliConfig::load(config_path.to_str()?) {
                    Ok(config) => return Some((config, config_path)),
                    Err(e) => tracing::warn!(path = %config_path.display(), error = %e, "skipping unreadable config"),
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Get the platform-specific data directory.
fn data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from("/tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".scout.toml"),
            "[api]\nbase_url = \"https://shop.test\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = find_config(&nested).unwrap();
        assert_eq!(config.api.base_url, "https://shop.test");
        assert_eq!(path, dir.path().join(".scout.toml"));
    }

    #[test]
    fn test_storage_dir_relative_to_cwd() {
        let mut config = CliConfig::default();
        config.storage.path = Some(PathBuf::from(".scout"));
        let ctx = Context {
            config,
            output: Output::new(false, true),
            cwd: PathBuf::from("/work"),
            config_path: None,
        };
        assert_eq!(ctx.storage_dir(), PathBuf::from("/work/.scout"));
    }

    #[test]
    fn test_recent_persists_in_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CliConfig::default();
        config.storage.path = Some(dir.path().to_path_buf());
        let ctx = Context {
            config,
            output: Output::new(false, true),
            cwd: dir.path().to_path_buf(),
            config_path: None,
        };

        ctx.recent().unwrap().record("desk lamp", None).unwrap();
        let reloaded = ctx.recent().unwrap();
        assert_eq!(reloaded.entries()[0].query, "desk lamp");
    }
}
