mod support;

use loam::{FeatureId, IdMode, MemoryCache, NullCache, PropertyValue, Query};
use loam_core::stmt::{Expr, Value};

use std::sync::Arc;

/// An id set spanning two feature types fails fast in relational storage,
/// with a descriptive error instead of a partial result.
#[test]
fn mixed_type_id_filter_fails_fast_in_relational_storage() {
    let store = support::relational_store();

    let mut tx = store.transaction().unwrap();
    tx.insert(vec![support::road("Main Street", None)], IdMode::GenerateNew)
        .unwrap();
    tx.insert(vec![support::person("Alice")], IdMode::GenerateNew)
        .unwrap();
    tx.commit().unwrap();

    let err = store
        .query_ids(&[FeatureId::new("ROAD_1"), FeatureId::new("PERSON_1")])
        .unwrap_err();
    assert!(err.is_unsupported());
    assert!(err.to_string().contains("feature types"), "err: {err}");
}

/// Single-type id sets resolve through one IN-list statement.
#[test]
fn single_type_id_set_in_relational_storage() {
    let store = support::relational_store();

    let mut tx = store.transaction().unwrap();
    let first = tx
        .insert(vec![support::road("Main Street", None)], IdMode::GenerateNew)
        .unwrap();
    let second = tx
        .insert(vec![support::road("Side Street", None)], IdMode::GenerateNew)
        .unwrap();
    tx.commit().unwrap();

    let features: Vec<_> = store
        .query_ids(&[first[0].clone(), second[0].clone()])
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();
    assert_eq!(features.len(), 2);
}

/// BLOB storage stages the id set in a temporary table and joins, so a
/// mixed-type id set is fine there.
#[test]
fn mixed_type_id_set_in_blob_storage() {
    let store = support::blob_store(Arc::new(NullCache));

    let mut tx = store.transaction().unwrap();
    let road_ids = tx
        .insert(vec![support::road("Main Street", None)], IdMode::GenerateNew)
        .unwrap();
    let person_ids = tx
        .insert(vec![support::person("Alice")], IdMode::GenerateNew)
        .unwrap();
    tx.commit().unwrap();

    let features: Vec<_> = store
        .query_ids(&[road_ids[0].clone(), person_ids[0].clone()])
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();

    assert_eq!(features.len(), 2);
    let mut types: Vec<_> = features.iter().map(|f| f.type_name.clone()).collect();
    types.sort();
    assert_eq!(types, ["Person", "Road"]);
}

/// An id that matches no type's convention is an explicit error.
#[test]
fn unknown_id_convention_is_an_error() {
    let store = support::relational_store();
    let err = store.query_ids(&[FeatureId::new("BRIDGE_1")]).unwrap_err();
    assert!(err.is_unsupported());
}

/// `get_by_id` goes through the id path and consults the cache on the
/// second fetch.
#[test]
fn get_by_id_uses_the_cache() {
    let cache = Arc::new(MemoryCache::new());
    let store = support::blob_store(cache.clone());

    let mut tx = store.transaction().unwrap();
    let ids = tx
        .insert(vec![support::road("Main Street", None)], IdMode::GenerateNew)
        .unwrap();
    tx.commit().unwrap();

    assert!(cache.is_empty());

    let first = store.get_by_id(&ids[0]).unwrap().unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(
        first.property("name"),
        Some(&PropertyValue::Primitive(Value::from("Main Street")))
    );

    // The second fetch returns the cached object without re-decoding
    let second = store.get_by_id(&ids[0]).unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let missing = store.get_by_id(&FeatureId::new("ROAD_nope")).unwrap();
    assert!(missing.is_none());

    // A filter query still sees mapped predicates residually in BLOB mode
    let features: Vec<_> = store
        .query(Query::new("Road").filter(Expr::eq(
            Expr::property("name"),
            Expr::value("Main Street"),
        )))
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();
    assert_eq!(features.len(), 1);
}
