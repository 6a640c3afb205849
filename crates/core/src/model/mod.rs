//! Graph data model shared by stores and the reconciler

mod graph;
mod properties;
mod spec;

pub use graph::{Direction, Node, NodeId, Relationship, RelationshipId};
pub use properties::{Properties, PropertyValue};
pub use spec::{
    Endpoint, RelationshipPattern, RelationshipSpec, RelationshipSpecBuilder,
    RelationshipSpecBuilderError,
};
