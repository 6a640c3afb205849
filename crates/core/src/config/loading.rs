//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{
    Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File, FileFormat,
};
use std::path::Path;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `GRAPHLINK_` and use double underscores
    /// for nested values. For example:
    /// - `GRAPHLINK_STORE__DATABASE=movies`
    ///
    /// The conventional `NEO4J_HOST`, `NEO4J_HTTP_PORT`, `NEO4J_DATABASE`, `NEO4J_USER`
    /// and `NEO4J_PASSWORD` variables take precedence over everything else.
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // config crate doesn't apply serde defaults for missing sections
        let builder = set_config_default(builder, "store.provider", default_store_provider())?;
        let builder = set_config_default(builder, "store.scheme", default_scheme())?;
        let builder = set_config_default(builder, "store.host", default_neo4j_host())?;
        let builder = set_config_default(
            builder,
            "store.http_port",
            i64::from(default_neo4j_http_port()),
        )?;
        let builder = set_config_default(builder, "store.database", default_neo4j_database())?;
        let builder = set_config_default(builder, "store.user", default_neo4j_user())?;
        let builder = set_config_default(builder, "store.password", default_neo4j_password())?;
        let builder =
            set_config_default(builder, "store.timeout_secs", default_timeout_secs() as i64)?;
        let mut builder = set_config_default(
            builder,
            "store.max_batch_size",
            default_max_batch_size() as i64,
        )?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        // Add environment variables with GRAPHLINK_ prefix
        builder = builder.add_source(
            Environment::with_prefix("GRAPHLINK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Neo4j configuration
        if let Ok(host) = std::env::var("NEO4J_HOST") {
            builder = builder
                .set_override("store.host", host)
                .map_err(|e| Error::config(format!("Failed to set NEO4J_HOST: {e}")))?;
        }
        if let Ok(port) = std::env::var("NEO4J_HTTP_PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                builder = builder
                    .set_override("store.http_port", i64::from(port_num))
                    .map_err(|e| Error::config(format!("Failed to set NEO4J_HTTP_PORT: {e}")))?;
            }
        }
        if let Ok(database) = std::env::var("NEO4J_DATABASE") {
            builder = builder
                .set_override("store.database", database)
                .map_err(|e| Error::config(format!("Failed to set NEO4J_DATABASE: {e}")))?;
        }
        if let Ok(user) = std::env::var("NEO4J_USER") {
            builder = builder
                .set_override("store.user", user)
                .map_err(|e| Error::config(format!("Failed to set NEO4J_USER: {e}")))?;
        }
        if let Ok(password) = std::env::var("NEO4J_PASSWORD") {
            builder = builder
                .set_override("store.password", password)
                .map_err(|e| Error::config(format!("Failed to set NEO4J_PASSWORD: {e}")))?;
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.graphlink/config.toml or custom path)
    /// 3. Environment variables (GRAPHLINK_*, then NEO4J_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        let config = Self::from_file(&path)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}
