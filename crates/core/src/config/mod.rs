//! Configuration module for graphlink
//!
//! Configuration can be loaded from TOML files and/or environment variables.

mod defaults;
mod loading;
mod store;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use defaults::default_max_batch_size;

use defaults::*;

/// Store providers accepted by [`StoreConfig::provider`]
pub const STORE_PROVIDERS: &[&str] = &["rest", "mock"];

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.graphlink/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".graphlink").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Graph store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

/// Configuration for the graph store connection
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Provider type: "rest" or "mock"
    #[serde(default = "default_store_provider")]
    pub provider: String,

    /// URL scheme of the HTTP endpoint: "http" or "https"
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Neo4j host
    #[serde(default = "default_neo4j_host")]
    pub host: String,

    /// Neo4j HTTP port
    #[serde(default = "default_neo4j_http_port")]
    pub http_port: u16,

    /// Database to run statements against
    #[serde(default = "default_neo4j_database")]
    pub database: String,

    /// Neo4j username
    #[serde(default = "default_neo4j_user")]
    pub user: String,

    /// Neo4j password
    #[serde(default = "default_neo4j_password")]
    pub password: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum operations accepted in a single batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_store_provider(),
            scheme: default_scheme(),
            host: default_neo4j_host(),
            http_port: default_neo4j_http_port(),
            database: default_neo4j_database(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
            timeout_secs: default_timeout_secs(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("provider", &self.provider)
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("http_port", &self.http_port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***REDACTED***")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_batch_size", &self.max_batch_size)
            .finish()
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.store.validate()
    }

    /// Serialize the configuration back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))
    }

    /// Saves the configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_string)
            .context(format!("Failed to write config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }
}
