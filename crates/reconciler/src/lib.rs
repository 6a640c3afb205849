//! Idempotent relationship reconciliation over a graph store
//!
//! [`RelationshipReconciler`] turns a batch of [`RelationshipSpec`]s into
//! relationships, reusing existing edges and creating only the missing ones
//! in a single atomic store batch. [`Graph`] bundles it with the plain node
//! and relationship operations, and [`ObjectStore`] maps `serde` values onto
//! nodes and their outgoing relationships.
//!
//! ```no_run
//! use graphlink_core::prelude::*;
//! use graphlink_reconciler::Graph;
//! use graphlink_storage::MockGraphStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> graphlink_reconciler::Result<()> {
//! let graph = Graph::new(Arc::new(MockGraphStore::new()));
//! let nodes = graph
//!     .create_nodes(&[props! { "name" => "Alice" }, props! { "name" => "Bob" }])
//!     .await?;
//! let rels = graph
//!     .get_or_create_relationships(&[RelationshipSpec::new(&nodes[0], "KNOWS", &nodes[1])])
//!     .await?;
//! assert_eq!(rels.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! [`RelationshipSpec`]: graphlink_core::RelationshipSpec

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod error;
mod graph;
pub mod ogm;
mod reconciler;

pub use error::{ReconcileError, Result};
pub use graph::Graph;
pub use ogm::{Mapped, ObjectStore};
pub use reconciler::{validate, RelationshipReconciler};
