use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base_url '{url}': {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("database_path must not be empty")]
    EmptyDatabasePath,

    #[error("malformed config: {0}")]
    Malformed(String),
}

/// Settings the shell hands to the core at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    /// Root of the recipe service. Any http(s) host is accepted, local and
    /// staging services included.
    pub base_url: String,
    /// `None` keeps favorites in memory only.
    pub database_path: Option<PathBuf>,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            database_path: None,
        }
    }
}

impl RecipeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;
        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyDatabasePath);
            }
        }
        Ok(())
    }

    /// `base_url` as a directory URL, so endpoint paths join beneath it.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            reason,
        };

        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let url = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".into()));
        }
        Ok(url)
    }
}
