//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_STORE_PROVIDER: &str = "rest";
pub(crate) const DEFAULT_SCHEME: &str = "http";
pub(crate) const DEFAULT_NEO4J_HOST: &str = "localhost";
pub(crate) const DEFAULT_NEO4J_DATABASE: &str = "neo4j";
pub(crate) const DEFAULT_NEO4J_USER: &str = "neo4j";
pub(crate) const DEFAULT_NEO4J_PASSWORD: &str = "neo4j";

pub(crate) fn default_store_provider() -> String {
    DEFAULT_STORE_PROVIDER.to_string()
}

pub(crate) fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

pub(crate) fn default_neo4j_host() -> String {
    DEFAULT_NEO4J_HOST.to_string()
}

pub(crate) fn default_neo4j_http_port() -> u16 {
    7474
}

pub(crate) fn default_neo4j_database() -> String {
    DEFAULT_NEO4J_DATABASE.to_string()
}

pub(crate) fn default_neo4j_user() -> String {
    DEFAULT_NEO4J_USER.to_string()
}

pub(crate) fn default_neo4j_password() -> String {
    DEFAULT_NEO4J_PASSWORD.to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    30
}

/// Upper bound on statements sent in one transaction
pub fn default_max_batch_size() -> usize {
    1000
}
