use crate::{mock::MockGraphStore, neo4j::Neo4jGraphStore, GraphStore};
use graphlink_core::{config::StoreConfig, Error};
use std::sync::Arc;
use tracing::debug;

/// Creates a graph store based on configuration.
///
/// Returns a trait object so the HTTP-backed store and the in-memory mock can
/// be used interchangeably.
///
/// # Errors
/// Returns an error if the configuration is invalid or names an unknown provider
///
/// # Example
/// ```no_run
/// use graphlink_core::StoreConfig;
/// use graphlink_storage::create_graph_store;
///
/// # fn example() -> graphlink_core::Result<()> {
/// let store = create_graph_store(&StoreConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub fn create_graph_store(config: &StoreConfig) -> Result<Arc<dyn GraphStore>, Error> {
    config.validate()?;
    debug!(provider = %config.provider, "Creating graph store");
    match config.provider.as_str() {
        "rest" => Ok(Arc::new(Neo4jGraphStore::new(config)?) as Arc<dyn GraphStore>),
        "mock" => Ok(Arc::new(MockGraphStore::new()) as Arc<dyn GraphStore>),
        other => Err(Error::config(format!("Unknown store provider: {other}"))),
    }
}
