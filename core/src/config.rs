//! API configuration.
//!
//! The API middleware resolves every [`ApiCall`](crate::api::ApiCall) endpoint
//! against a single API root. The root comes from the application, or from
//! the `SHOPFRONT_API_ROOT` environment variable.
//!
//! ```
//! use shopfront_core::config::ApiConfig;
//!
//! let config = ApiConfig::new("https://shop.example/api/").unwrap();
//! assert_eq!(config.api_root, "https://shop.example/api/");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the API root
pub const API_ROOT_VAR: &str = "SHOPFRONT_API_ROOT";

/// API root used when nothing else is configured
pub const DEFAULT_API_ROOT: &str = "http://localhost:3000/api/";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// API root is not an http(s) URL
    #[error("API root must start with http:// or https://, got `{0}`")]
    InvalidScheme(String),

    /// API root does not end with a slash, so endpoints would be glued onto
    /// its last path segment
    #[error("API root must end with `/`, got `{0}`")]
    MissingTrailingSlash(String),
}

/// Where the REST backend lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Absolute URL prefix for all endpoints, ending with `/`
    pub api_root: String,
}

impl ApiConfig {
    /// Creates a validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `api_root` is not an http(s) URL ending
    /// with `/`.
    pub fn new(api_root: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            api_root: api_root.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from `SHOPFRONT_API_ROOT`, falling back to
    /// [`DEFAULT_API_ROOT`]
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the variable holds an invalid root.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the looked-up root is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(API_ROOT_VAR).filter(|root| !root.trim().is_empty()) {
            Some(root) => Self::new(root.trim()),
            None => {
                tracing::debug!(default = DEFAULT_API_ROOT, "{API_ROOT_VAR} not set");
                Ok(Self::default())
            },
        }
    }

    /// Checks the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_root.starts_with("http://") || self.api_root.starts_with("https://")) {
            return Err(ConfigError::InvalidScheme(self.api_root.clone()));
        }
        if !self.api_root.ends_with('/') {
            return Err(ConfigError::MissingTrailingSlash(self.api_root.clone()));
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
        }
    }
}
