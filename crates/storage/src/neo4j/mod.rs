//! Neo4j store over the transactional HTTP endpoint

mod client;
mod response;
mod statements;
mod store;

pub use store::Neo4jGraphStore;
