//! Graph store capability and its implementations
//!
//! [`GraphStore`] is the seam between the reconciler and a database. Two
//! implementations are provided: [`Neo4jGraphStore`] talks to a Neo4j server
//! over its transactional HTTP endpoint, and [`MockGraphStore`] keeps the
//! graph in memory for tests.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod batch;
pub mod error;
mod factory;
pub mod mock;
mod neo4j;
mod traits;

pub use batch::{BatchOperation, BatchOutcome};
pub use error::{Result, StorageError};
pub use factory::create_graph_store;
pub use mock::MockGraphStore;
pub use neo4j::Neo4jGraphStore;
pub use traits::GraphStore;
