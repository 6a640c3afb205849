//! Core types for the graphlink graph-database client
//!
//! This crate provides the foundational pieces shared by the store
//! implementations and the reconciler:
//!
//! - **Model**: nodes, relationships, properties and relationship specifications
//! - **Cypher**: identifier escaping and literal rendering
//! - **Configuration**: store connection settings
//! - **Error handling**: unified error types
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod cypher;
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use config::{Config, StoreConfig};
pub use error::{Error, Result, ResultExt};
pub use model::{
    Direction, Endpoint, Node, NodeId, Properties, PropertyValue, Relationship, RelationshipId,
    RelationshipPattern, RelationshipSpec, RelationshipSpecBuilder,
};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::model::{Endpoint, NodeId, Properties, PropertyValue, RelationshipSpec};
    pub use crate::props;
}
