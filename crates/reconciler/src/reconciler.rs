//! Batched, idempotent get-or-create of relationships

use graphlink_core::{Relationship, RelationshipSpec};
use graphlink_storage::{BatchOperation, GraphStore, StorageError};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ReconcileError, Result};

/// Check every specification before anything is sent to the store
///
/// Fails on the first specification that no store could satisfy.
pub fn validate(specs: &[RelationshipSpec]) -> Result<()> {
    for (index, spec) in specs.iter().enumerate() {
        if spec.is_fully_wildcard() {
            return Err(ReconcileError::InvalidSpecification {
                index,
                reason: "start and end must not both be wildcards".to_string(),
            });
        }
        if spec.rel_type.is_empty() {
            return Err(ReconcileError::InvalidSpecification {
                index,
                reason: "relationship type must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

/// Identical specifications collapsed to one operation each
///
/// `slots[i]` is the position in `unique` serving input `i`, and `first[u]`
/// is the first input position of unique specification `u`.
struct Deduplicated<'a> {
    unique: Vec<&'a RelationshipSpec>,
    slots: Vec<usize>,
    first: Vec<usize>,
}

fn deduplicate(specs: &[RelationshipSpec]) -> Deduplicated<'_> {
    let mut unique: Vec<&RelationshipSpec> = Vec::new();
    let mut first = Vec::new();
    let slots = specs
        .iter()
        .enumerate()
        .map(|(index, spec)| match unique.iter().position(|u| *u == spec) {
            Some(slot) => slot,
            None => {
                unique.push(spec);
                first.push(index);
                unique.len() - 1
            }
        })
        .collect();
    Deduplicated {
        unique,
        slots,
        first,
    }
}

/// Resolves relationship specifications to relationships, creating them only when missing
///
/// Each call is one atomic store batch, so a call either returns a reference
/// for every specification or leaves the store untouched. Calling again with
/// the same specifications returns the same references.
#[derive(Clone)]
pub struct RelationshipReconciler {
    store: Arc<dyn GraphStore>,
}

impl RelationshipReconciler {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Get or create one relationship per specification
    ///
    /// `output[i]` corresponds to `specs[i]`. Identical specifications in the
    /// same call resolve to the same relationship.
    ///
    /// # Errors
    /// * [`ReconcileError::InvalidSpecification`] if a specification has two
    ///   wildcard ends or an empty type; the store is not contacted
    /// * [`ReconcileError::StoreUnavailable`] if the store cannot be reached
    /// * [`ReconcileError::AmbiguousMatch`] if several relationships match one
    ///   specification
    /// * [`ReconcileError::Store`] for any other store failure, such as a
    ///   specification naming a node that does not exist
    pub async fn reconcile(&self, specs: &[RelationshipSpec]) -> Result<Vec<Relationship>> {
        validate(specs)?;
        if specs.is_empty() {
            return Ok(Vec::new());
        }

        let dedup = deduplicate(specs);
        let operations: Vec<BatchOperation> = dedup
            .unique
            .iter()
            .map(|spec| BatchOperation::GetOrCreateRelationship((*spec).clone()))
            .collect();
        debug!(
            specs = specs.len(),
            operations = operations.len(),
            "Reconciling relationships"
        );

        let outcomes = self.store.execute_batch(&operations).await.map_err(|e| {
            let err = ReconcileError::from(e)
                .map_index(|slot| dedup.first.get(slot).copied().unwrap_or(slot));
            match &err {
                ReconcileError::AmbiguousMatch { index, matches } => {
                    let spec = specs.get(*index).map(ToString::to_string).unwrap_or_default();
                    warn!(%spec, matches, "Ambiguous relationship match, batch rolled back");
                }
                _ => warn!("Relationship reconciliation failed: {err}"),
            }
            err
        })?;
        if outcomes.len() != operations.len() {
            return Err(ReconcileError::Store(StorageError::Protocol(format!(
                "expected {} outcomes, got {}",
                operations.len(),
                outcomes.len()
            ))));
        }

        let resolved = outcomes
            .into_iter()
            .map(|outcome| {
                outcome.into_relationship().ok_or_else(|| {
                    ReconcileError::Store(StorageError::Protocol(
                        "expected a relationship outcome".to_string(),
                    ))
                })
            })
            .collect::<Result<Vec<Relationship>>>()?;

        Ok(dedup
            .slots
            .iter()
            .map(|&slot| resolved[slot].clone())
            .collect())
    }
}

impl std::fmt::Debug for RelationshipReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipReconciler").finish_non_exhaustive()
    }
}
