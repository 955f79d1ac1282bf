//! Application configuration module for episode-finder
//!
//! Provides TOML-based configuration with environment variable override support.
//! Priority: CLI args > Environment variables > Config file > Defaults

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::path_resolver;
use crate::classify::DEFAULT_OUTLIER_THRESHOLD;
use crate::finder::DEFAULT_SEARCH_LIMIT;
use crate::source::reddit::MAX_SEARCH_LIMIT;
use crate::source::RedditClient;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Reddit application client id
    #[serde(default)]
    reddit_client_id: Option<String>,

    /// Reddit application client secret
    #[serde(default)]
    reddit_client_secret: Option<String>,

    /// User agent sent with every Reddit request
    #[serde(default = "default_user_agent")]
    reddit_user_agent: String,

    /// Search terms used to find discussion threads
    #[serde(default = "default_search_query")]
    search_query: String,

    /// Submissions fetched per community (1..=1000)
    #[serde(default = "default_search_limit")]
    search_limit: usize,

    /// Standard deviations from the mean similarity before a title is dropped
    #[serde(default = "default_outlier_threshold")]
    outlier_threshold: f64,

    /// Address the HTTP service binds to
    #[serde(default = "default_bind_address")]
    bind_address: String,
}

fn default_user_agent() -> String {
    format!("{}/{}", crate::NAME, crate::VERSION)
}

fn default_search_query() -> String {
    RedditClient::DEFAULT_SEARCH_QUERY.to_string()
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_outlier_threshold() -> f64 {
    DEFAULT_OUTLIER_THRESHOLD
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reddit_client_id: None,
            reddit_client_secret: None,
            reddit_user_agent: default_user_agent(),
            search_query: default_search_query(),
            search_limit: default_search_limit(),
            outlier_threshold: default_outlier_threshold(),
            bind_address: default_bind_address(),
        }
    }
}

fn env_var(primary: &str, fallback: Option<&str>) -> Option<String> {
    std::env::var(primary)
        .ok()
        .or_else(|| fallback.and_then(|name| std::env::var(name).ok()))
}

/// Values explicitly set by a higher-priority source
///
/// `None` leaves the underlying value alone, whatever it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: Option<String>,
    pub search_query: Option<String>,
    pub search_limit: Option<usize>,
    pub outlier_threshold: Option<f64>,
    pub bind_address: Option<String>,
}

impl ConfigOverrides {
    /// Collect the overrides set through environment variables
    pub fn from_env() -> Self {
        Self {
            reddit_client_id: env_var("EPISODE_FINDER_REDDIT_CLIENT_ID", Some("REDDIT_CLIENT_ID")),
            reddit_client_secret: env_var(
                "EPISODE_FINDER_REDDIT_CLIENT_SECRET",
                Some("REDDIT_CLIENT_SECRET"),
            ),
            reddit_user_agent: env_var("EPISODE_FINDER_REDDIT_USER_AGENT", Some("REDDIT_USER_AGENT")),
            search_query: env_var("EPISODE_FINDER_SEARCH_QUERY", None),
            search_limit: env_var("EPISODE_FINDER_SEARCH_LIMIT", None).and_then(|v| v.parse().ok()),
            outlier_threshold: env_var("EPISODE_FINDER_OUTLIER_THRESHOLD", None)
                .and_then(|v| v.parse().ok()),
            bind_address: env_var("EPISODE_FINDER_BIND_ADDRESS", None),
        }
    }
}

impl AppConfig {
    /// Create config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::default().merge_with(&ConfigOverrides::from_env())
    }

    /// Load the config file (explicit path, or the XDG default when present)
    /// and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = path_resolver::get_default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        let config = file_config.merge_with(&ConfigOverrides::from_env());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides; every value they set wins, even one equal to the default
    pub fn merge_with(&self, overrides: &ConfigOverrides) -> Self {
        Self {
            reddit_client_id: overrides
                .reddit_client_id
                .clone()
                .or_else(|| self.reddit_client_id.clone()),
            reddit_client_secret: overrides
                .reddit_client_secret
                .clone()
                .or_else(|| self.reddit_client_secret.clone()),
            reddit_user_agent: overrides
                .reddit_user_agent
                .clone()
                .unwrap_or_else(|| self.reddit_user_agent.clone()),
            search_query: overrides
                .search_query
                .clone()
                .unwrap_or_else(|| self.search_query.clone()),
            search_limit: overrides.search_limit.unwrap_or(self.search_limit),
            outlier_threshold: overrides.outlier_threshold.unwrap_or(self.outlier_threshold),
            bind_address: overrides
                .bind_address
                .clone()
                .unwrap_or_else(|| self.bind_address.clone()),
        }
    }

    /// Override search_limit
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Override bind_address
    pub fn with_bind_address(mut self, addr: &str) -> Self {
        self.bind_address = addr.to_string();
        self
    }

    /// Override outlier_threshold
    pub fn with_outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    /// Set Reddit credentials
    pub fn with_credentials(mut self, client_id: &str, client_secret: &str) -> Self {
        self.reddit_client_id = Some(client_id.to_string());
        self.reddit_client_secret = Some(client_secret.to_string());
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search_limit == 0 || self.search_limit > MAX_SEARCH_LIMIT {
            return Err(anyhow!(
                "search_limit must be between 1 and {}, got {}",
                MAX_SEARCH_LIMIT,
                self.search_limit
            ));
        }

        if !self.outlier_threshold.is_finite() || self.outlier_threshold <= 0.0 {
            return Err(anyhow!(
                "outlier_threshold must be a positive number, got {}",
                self.outlier_threshold
            ));
        }

        if self.search_query.trim().is_empty() {
            return Err(anyhow!("search_query must not be empty"));
        }

        Ok(())
    }

    /// Build a Reddit client from the configured credentials
    pub fn reddit_client(&self) -> Result<RedditClient> {
        let (Some(id), Some(secret)) = (&self.reddit_client_id, &self.reddit_client_secret) else {
            return Err(anyhow!(
                "Reddit credentials missing: set REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET \
                 or add them to {}",
                path_resolver::get_default_config_path().display()
            ));
        };

        Ok(RedditClient::new(id.as_str(), secret.as_str(), self.reddit_user_agent.as_str())
            .with_search_query(self.search_query.as_str()))
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))
    }

    // Getters
    pub fn reddit_client_id(&self) -> Option<&str> {
        self.reddit_client_id.as_deref()
    }

    pub fn reddit_user_agent(&self) -> &str {
        &self.reddit_user_agent
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    pub fn outlier_threshold(&self) -> f64 {
        self.outlier_threshold
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }
}
