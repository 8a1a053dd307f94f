//! Bindery Configuration Module
//!
//! Holds the storage URL conventions the path resolver uses to recognize
//! resource URLs. Config is a YAML file:
//!
//! ```yaml
//! storage:
//!   host_suffixes:
//!     - .blob.core.windows.net
//!   path_style_hosts:
//!     - 127.0.0.1:10000
//! ```
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Explicit path (`--config <file>`)
//! 2. `BINDERY_CONFIG` environment variable
//! 3. Defaults

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BindingError, Result};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "BINDERY_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BindingConfig {
    /// Storage service URL conventions
    #[serde(default)]
    pub storage: StorageConventions,
}

/// How storage resource URLs are laid out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConventions {
    /// Host suffixes for account-per-host URLs: `https://<account><suffix>/container/item`
    #[serde(default = "default_host_suffixes")]
    pub host_suffixes: Vec<String>,

    /// Hosts (with port) for path-style URLs: `http://<host>/<account>/container/item`
    #[serde(default = "default_path_style_hosts")]
    pub path_style_hosts: Vec<String>,
}

impl Default for StorageConventions {
    fn default() -> Self {
        Self {
            host_suffixes: default_host_suffixes(),
            path_style_hosts: default_path_style_hosts(),
        }
    }
}

fn default_host_suffixes() -> Vec<String> {
    vec![".blob.core.windows.net".to_string()]
}

fn default_path_style_hosts() -> Vec<String> {
    vec!["127.0.0.1:10000".to_string(), "localhost:10000".to_string()]
}

impl BindingConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| BindingError::Config {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Resolve configuration: explicit path, then `BINDERY_CONFIG`, then defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Check the conventions are usable
    pub fn validate(&self) -> Result<()> {
        for suffix in &self.storage.host_suffixes {
            if !suffix.starts_with('.') || suffix.len() < 2 {
                return Err(BindingError::Config {
                    reason: format!("host suffix '{}' must start with '.'", suffix),
                });
            }
        }

        for host in &self.storage.path_style_hosts {
            if host.is_empty() || host.contains('/') {
                return Err(BindingError::Config {
                    reason: format!("path-style host '{}' must be a bare host[:port]", host),
                });
            }
        }

        Ok(())
    }
}
