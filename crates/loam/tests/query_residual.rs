mod support;

use loam::{IdMode, NullCache, PropertyValue, Query};
use loam_core::stmt::{Expr, OrderBy, Page, Value};

use std::sync::Arc;

fn insert_annotated_roads(store: &loam::Store) {
    let mut tx = store.transaction().unwrap();
    for (name, note) in [("Main Street", "x"), ("Side Street", "y"), ("High Street", "x")] {
        let mut road = support::road(name, None);
        // `note` is not mapped anywhere; only the BLOB payload carries it
        road.push_property("note", PropertyValue::Primitive(Value::from(note)));
        tx.insert(vec![road], IdMode::GenerateNew).unwrap();
    }
    tx.commit().unwrap();
}

/// A predicate on an unmapped property never errors and never silently
/// drops matching rows: the fetch goes out unfiltered and the predicate is
/// applied in memory over decoded features.
#[test]
fn unmapped_predicate_becomes_residual_filter() {
    let store = support::blob_store(Arc::new(NullCache));
    insert_annotated_roads(&store);

    let features: Vec<_> = store
        .query(
            Query::new("Road")
                .filter(Expr::eq(Expr::property("note"), Expr::value("x"))),
        )
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();

    assert_eq!(features.len(), 2);
    for feature in &features {
        assert_eq!(
            feature.property("note"),
            Some(&PropertyValue::Primitive(Value::from("x")))
        );
    }
}

/// An unmappable sort key forces the whole sort (and its paging) into
/// memory, after the residual filter.
#[test]
fn residual_sort_and_paging() {
    let store = support::blob_store(Arc::new(NullCache));
    insert_annotated_roads(&store);

    let features: Vec<_> = store
        .query(
            Query::new("Road")
                .order_by(OrderBy::asc("name"))
                .page(Page::limit(2)),
        )
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();

    let names: Vec<_> = features
        .iter()
        .map(|f| match f.property("name") {
            Some(PropertyValue::Primitive(Value::String(name))) => name.clone(),
            other => panic!("unexpected name: {other:?}"),
        })
        .collect();
    assert_eq!(names, ["High Street", "Main Street"]);
}

/// The same unmapped-property filter in relational storage: the engine
/// fetches everything and evaluates the predicate in memory. Unmapped
/// properties were never persisted, so nothing matches, but nothing errors
/// either.
#[test]
fn unmapped_predicate_in_relational_storage() {
    let store = support::relational_store();

    let mut tx = store.transaction().unwrap();
    let mut road = support::road("Main Street", None);
    road.push_property("note", PropertyValue::Primitive(Value::from("x")));
    tx.insert(vec![road], IdMode::GenerateNew).unwrap();
    tx.commit().unwrap();

    let features: Vec<_> = store
        .query(
            Query::new("Road")
                .filter(Expr::eq(Expr::property("note"), Expr::value("x"))),
        )
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();
    assert!(features.is_empty());

    // Without the unmapped predicate the row is there
    let all: Vec<_> = store
        .query(Query::new("Road"))
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();
    assert_eq!(all.len(), 1);
}

/// Mapped predicates compose with a bounding-box prefilter in one
/// statement in hybrid storage; the decoded payload is the materialized
/// form.
#[test]
fn hybrid_mapped_filter_with_bbox_prefilter() {
    let store = support::hybrid_store();

    let mut tx = store.transaction().unwrap();
    for name in ["Main Street", "Side Street"] {
        tx.insert(vec![support::road(name, None)], IdMode::GenerateNew)
            .unwrap();
    }
    tx.commit().unwrap();

    // Both roads share the fixture envelope (0,0)-(10,5)
    let hit: Vec<_> = store
        .query(
            Query::new("Road")
                .filter(Expr::eq(Expr::property("name"), Expr::value("Main Street")))
                .bbox(loam::Envelope::new(5.0, 0.0, 20.0, 20.0)),
        )
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();
    assert_eq!(hit.len(), 1);

    let miss: Vec<_> = store
        .query(
            Query::new("Road")
                .filter(Expr::eq(Expr::property("name"), Expr::value("Main Street")))
                .bbox(loam::Envelope::new(50.0, 50.0, 60.0, 60.0)),
        )
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();
    assert!(miss.is_empty());
}
