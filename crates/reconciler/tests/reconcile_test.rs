//! Reconciliation behavior against the in-memory store

use anyhow::Result;
use graphlink_core::{props, Endpoint, NodeId, Properties, PropertyValue, RelationshipSpec};
use graphlink_reconciler::{Graph, ReconcileError};
use graphlink_storage::{GraphStore, MockGraphStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn setup(names: &[&str]) -> Result<(MockGraphStore, Graph, Vec<NodeId>)> {
    init_tracing();
    let store = MockGraphStore::new();
    let graph = Graph::new(Arc::new(store.clone()));
    let properties: Vec<Properties> = names.iter().map(|name| props! { "name" => *name }).collect();
    let nodes = graph.create_nodes(&properties).await?;
    Ok((store, graph, nodes.into_iter().map(|n| n.id).collect()))
}

#[tokio::test]
async fn test_repeated_reconcile_returns_same_relationship() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    let specs = [RelationshipSpec::new(nodes[0], "KNOWS", nodes[1])];

    let first = graph.get_or_create_relationships(&specs).await?;
    assert_eq!(store.relationship_count(), 1);
    let second = graph.get_or_create_relationships(&specs).await?;

    assert_eq!(first, second);
    assert_eq!(store.relationship_count(), 1);
    assert_eq!(first[0].start, nodes[0]);
    assert_eq!(first[0].rel_type, "KNOWS");
    assert_eq!(first[0].end, nodes[1]);
    Ok(())
}

#[tokio::test]
async fn test_reconcile_reuses_existing_relationship() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    let existing = graph
        .create_relationship_to(nodes[0], "KNOWS", nodes[1], &props! { "since" => 1999 })
        .await?;

    let rels = graph
        .get_or_create_relationships(&[RelationshipSpec::new(nodes[0], "KNOWS", nodes[1])])
        .await?;

    assert!(rels[0].same_edge(&existing));
    assert_eq!(store.relationship_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_duplicates_in_one_batch_create_one_relationship() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    let spec = RelationshipSpec::new(nodes[0], "KNOWS", nodes[1]);

    let rels = graph
        .get_or_create_relationships(&[spec.clone(), spec])
        .await?;

    assert_eq!(rels.len(), 2);
    assert_eq!(rels[0], rels[1]);
    assert_eq!(store.relationship_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_double_wildcard_is_rejected_without_store_access() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    let round_trips = store.round_trips();

    for properties in [None, Some(Properties::new()), Some(props! { "since" => 1999 })] {
        let mut wildcard = RelationshipSpec::new(Endpoint::Wildcard, "KNOWS", Endpoint::Wildcard);
        wildcard.properties = properties;
        let err = graph
            .get_or_create_relationships(&[
                RelationshipSpec::new(nodes[0], "KNOWS", nodes[1]),
                wildcard,
            ])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::InvalidSpecification { index: 1, .. }
        ));
    }

    assert_eq!(store.round_trips(), round_trips);
    assert_eq!(store.relationship_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_relate_with_no_start_node() -> Result<()> {
    let (store, graph, nodes) = setup(&["Bob"]).await?;
    let bob = nodes[0];

    let rels = graph
        .get_or_create_relationships(&[RelationshipSpec::new(
            Endpoint::Wildcard,
            "KNOWS",
            bob,
        )])
        .await?;

    assert_eq!(rels[0].end, bob);
    assert_ne!(rels[0].start, bob);
    assert_eq!(store.node_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_relate_with_no_end_node() -> Result<()> {
    let (_store, graph, nodes) = setup(&["Alice"]).await?;
    let alice = nodes[0];
    let spec = RelationshipSpec::new(alice, "LIKES", Endpoint::Wildcard);

    let first = graph.get_or_create_relationships(&[spec.clone()]).await?;
    assert_eq!(first[0].start, alice);

    // the wildcard matches the node created the first time
    let second = graph.get_or_create_relationships(&[spec]).await?;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_relate_with_data() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    let spec = RelationshipSpec::new(nodes[0], "KNOWS", nodes[1])
        .with_properties(props! { "since" => 2006 });

    let first = graph.get_or_create_relationships(&[spec.clone()]).await?;
    assert_eq!(first[0].property("since"), Some(&PropertyValue::Integer(2006)));

    let second = graph.get_or_create_relationships(&[spec]).await?;
    assert_eq!(first, second);
    assert_eq!(store.relationship_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_relate_with_null_data() -> Result<()> {
    let (_store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    let spec = RelationshipSpec::new(nodes[0], "KNOWS", nodes[1])
        .with_properties(props! { "since" => 2006, "dummy" => PropertyValue::Null });

    let rels = graph.get_or_create_relationships(&[spec]).await?;

    assert!(rels[0].contains_key("dummy"));
    assert_eq!(rels[0].property("dummy"), Some(&PropertyValue::Null));
    let stored = graph.relationship(rels[0].id).await?.unwrap();
    assert_eq!(stored.property("dummy"), Some(&PropertyValue::Null));
    Ok(())
}

#[tokio::test]
async fn test_different_properties_create_new_relationship() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    let base = RelationshipSpec::new(nodes[0], "KNOWS", nodes[1]);

    let first = graph
        .get_or_create_relationships(&[base.clone().with_properties(props! { "since" => 2006 })])
        .await?;
    let second = graph
        .get_or_create_relationships(&[base.with_properties(props! { "since" => 2007 })])
        .await?;

    assert!(!first[0].same_edge(&second[0]));
    assert_eq!(store.relationship_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_empty_properties_match_only_propertyless_edges() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    graph
        .create_relationship_to(nodes[0], "KNOWS", nodes[1], &props! { "since" => 1999 })
        .await?;

    let rels = graph
        .get_or_create_relationships(&[RelationshipSpec::new(nodes[0], "KNOWS", nodes[1])
            .with_properties(Properties::new())])
        .await?;

    assert!(rels[0].properties.is_empty());
    assert_eq!(store.relationship_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_complex_relate() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob", "Carol", "Dave"]).await?;
    let (alice, bob, carol, dave) = (nodes[0], nodes[1], nodes[2], nodes[3]);

    let rels1 = graph
        .get_or_create_relationships(&[
            RelationshipSpec::new(alice, "IS~MARRIED~TO", bob)
                .with_properties(props! { "since" => 1996 }),
            RelationshipSpec::new(alice, "DISLIKES!", carol)
                .with_properties(props! { "reason" => "youth" }),
        ])
        .await?;
    assert_eq!(rels1.len(), 2);

    let rels2 = graph
        .get_or_create_relationships(&[
            RelationshipSpec::new(bob, "WORKS WITH", carol)
                .with_properties(props! { "since" => 2004, "company" => "Megacorp" }),
            RelationshipSpec::new(alice, "DISLIKES!", carol)
                .with_properties(props! { "reason" => "youth" }),
            RelationshipSpec::new(bob, "WORKS WITH", dave)
                .with_properties(props! { "since" => 2009, "company" => "Megacorp" }),
        ])
        .await?;
    assert_eq!(rels2.len(), 3);
    assert_eq!(rels1[1], rels2[1]);
    assert_eq!(store.relationship_count(), 4);
    Ok(())
}

#[tokio::test]
async fn test_one_round_trip_per_call() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob", "Carol"]).await?;
    let before = store.round_trips();

    graph
        .get_or_create_relationships(&[
            RelationshipSpec::new(nodes[0], "KNOWS", nodes[1]),
            RelationshipSpec::new(nodes[1], "KNOWS", nodes[2]),
            RelationshipSpec::new(nodes[2], "KNOWS", Endpoint::Wildcard),
        ])
        .await?;

    assert_eq!(store.round_trips(), before + 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_batch_does_not_touch_store() -> Result<()> {
    let (store, graph, _nodes) = setup(&[]).await?;
    let before = store.round_trips();
    assert!(graph.get_or_create_relationships(&[]).await?.is_empty());
    assert_eq!(store.round_trips(), before);
    Ok(())
}

#[tokio::test]
async fn test_store_lost_mid_batch_creates_nothing() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    store.fail_next_batch_at(1);

    let specs = [
        RelationshipSpec::new(nodes[0], "KNOWS", Endpoint::Wildcard),
        RelationshipSpec::new(nodes[0], "KNOWS", nodes[1]),
    ];
    let err = graph.get_or_create_relationships(&specs).await.unwrap_err();

    assert!(matches!(err, ReconcileError::StoreUnavailable(_)));
    assert!(err.is_retryable());
    assert_eq!(store.node_count(), 2);
    assert_eq!(store.relationship_count(), 0);

    // retrying the same call succeeds
    let rels = graph.get_or_create_relationships(&specs).await?;
    assert_eq!(rels.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_store() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    store.set_unavailable(true);

    let err = graph
        .get_or_create_relationships(&[RelationshipSpec::new(nodes[0], "KNOWS", nodes[1])])
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::StoreUnavailable(_)));
    Ok(())
}

#[tokio::test]
async fn test_ambiguous_match_reports_input_index() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    let (alice, bob) = (nodes[0], nodes[1]);
    store.create_relationship(alice, "KNOWS", bob, &Properties::new()).await?;
    store
        .create_relationship(alice, "KNOWS", bob, &props! { "since" => 1999 })
        .await?;

    let fresh = RelationshipSpec::new(bob, "LIKES", alice);
    let ambiguous = RelationshipSpec::new(alice, "KNOWS", bob);
    let err = graph
        .get_or_create_relationships(&[fresh.clone(), fresh, ambiguous])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::AmbiguousMatch {
            index: 2,
            matches: 2
        }
    ));
    assert_eq!(store.relationship_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_node_is_store_error() -> Result<()> {
    let (_store, graph, nodes) = setup(&["Alice"]).await?;
    let err = graph
        .get_or_create_relationships(&[RelationshipSpec::new(nodes[0], "KNOWS", NodeId(404))])
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Store(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reconciles_create_one_relationship() -> Result<()> {
    let (store, graph, nodes) = setup(&["Alice", "Bob"]).await?;
    let spec = RelationshipSpec::new(nodes[0], "KNOWS", nodes[1]);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let graph = graph.clone();
            let spec = spec.clone();
            tokio::spawn(async move { graph.get_or_create_relationships(&[spec]).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        let rels = handle.await??;
        ids.push(rels[0].id);
    }

    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(store.relationship_count(), 1);
    Ok(())
}
