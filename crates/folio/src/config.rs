use folio_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pagination::PaginationStrategy;
use crate::scroll::ScrollOptions;

pub const BASE_URL_ENV: &str = "FOLIO_BASE_URL";
pub const MAX_RETRIES_ENV: &str = "FOLIO_MAX_RETRIES";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// List behaviour shared by every engine built from this config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub page_size: u32,
    /// Sort key for page-based resources
    pub sort_by: Option<String>,
    /// Ordering for token-based resources
    pub order_by: Option<String>,
    pub scroll_threshold: f64,
    pub debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            sort_by: None,
            order_by: None,
            scroll_threshold: 300.0,
            debounce_ms: 150,
        }
    }
}

impl EngineConfig {
    pub fn page_strategy(&self, default_sort: Option<&str>) -> PaginationStrategy {
        PaginationStrategy::page(self.page_size, self.sort_by.as_deref().or(default_sort))
    }

    pub fn token_strategy(&self, default_order: Option<&str>) -> PaginationStrategy {
        PaginationStrategy::token(self.page_size, self.order_by.as_deref().or(default_order))
    }

    pub fn scroll_options(&self) -> ScrollOptions {
        ScrollOptions {
            threshold: self.scroll_threshold,
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}

/// Top-level configuration file
///
/// ```yaml
/// client:
///   base_url: https://api.example.com/v1
///   max_retries: 2
/// engine:
///   page_size: 10
///   sort_by: datePublished
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub client: ClientConfig,
    pub engine: EngineConfig,
}

impl FolioConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: FolioConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file, then apply environment overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: FolioConfig = serde_yaml::from_str(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; empty values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.client.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(MAX_RETRIES_ENV) {
            self.client.max_retries = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{} must be a number, got {:?}", MAX_RETRIES_ENV, raw))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.client.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("client.base_url is empty".to_string()));
        }
        if self.engine.page_size == 0 {
            return Err(ConfigError::Invalid(
                "engine.page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
