//! Store-related configuration methods

use crate::error::{Error, Result};

use super::{StoreConfig, STORE_PROVIDERS};

impl StoreConfig {
    /// Base URL of the server's HTTP API, e.g. `http://localhost:7474`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.http_port)
    }

    /// URL of the transaction endpoint for the configured database
    pub fn transaction_url(&self) -> String {
        format!("{}/db/{}/tx", self.base_url(), self.database)
    }

    /// Validates the store settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - The provider is not one of [`STORE_PROVIDERS`]
    /// - The scheme is neither `http` nor `https`
    /// - The host or database name is empty
    /// - The timeout or maximum batch size is zero
    pub fn validate(&self) -> Result<()> {
        if !STORE_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid store provider '{}'. Valid providers: {}",
                self.provider,
                STORE_PROVIDERS.join(", ")
            )));
        }

        if self.scheme != "http" && self.scheme != "https" {
            return Err(Error::config(format!(
                "Invalid scheme '{}'. Must be 'http' or 'https'",
                self.scheme
            )));
        }

        if self.host.trim().is_empty() {
            return Err(Error::config("store.host must not be empty"));
        }

        if self.database.trim().is_empty() {
            return Err(Error::config("store.database must not be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(Error::config("store.timeout_secs must be greater than 0"));
        }

        if self.max_batch_size == 0 {
            return Err(Error::config("store.max_batch_size must be greater than 0"));
        }

        Ok(())
    }
}
