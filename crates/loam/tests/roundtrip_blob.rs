mod support;

use loam::{Feature, IdMode, NullCache, PropertyValue, Query};
use loam_core::stmt::Value;

use std::sync::Arc;

/// BLOB-mode round trip: everything the document carried comes back from
/// the decoded payload, modulo id assignment under GenerateNew.
#[test]
fn decode_of_encode_preserves_the_document() {
    let store = support::blob_store(Arc::new(NullCache));

    let original = support::road("Main Street", None);

    let mut tx = store.transaction().unwrap();
    let ids = tx
        .insert(vec![original.clone()], IdMode::GenerateNew)
        .unwrap();
    tx.commit().unwrap();

    let fetched = store.get_by_id(&ids[0]).unwrap().unwrap();

    assert_eq!(fetched.id.as_ref(), Some(&ids[0]));
    assert_eq!(fetched.type_name, "Road");

    // Property-by-property equality; the geometry keeps data, CRS and
    // envelope, and geometries gained an id during insert
    assert_eq!(fetched.properties.len(), original.properties.len());
    for (fetched, original) in fetched.properties.iter().zip(&original.properties) {
        assert_eq!(fetched.name, original.name);
        match (&fetched.value, &original.value) {
            (PropertyValue::Geometry(a), PropertyValue::Geometry(b)) => {
                assert_eq!(a.data, b.data);
                assert_eq!(a.crs, b.crs);
                assert_eq!(a.envelope, b.envelope);
            }
            (a, b) => assert_eq!(a, b),
        }
    }
}

/// The BLOB table's bounding-box columns index the feature envelope, so the
/// type envelope aggregates without touching payloads.
#[test]
fn envelope_aggregates_bbox_columns() {
    let store = support::blob_store(Arc::new(NullCache));

    let mut tx = store.transaction().unwrap();
    let mut far_road = support::road("Far Road", None);
    // Replace the geometry with one far away
    far_road.properties[0].value =
        PropertyValue::Geometry(support::line_geometry(100.0, 100.0, 110.0, 120.0));
    tx.insert(vec![support::road("Main Street", None)], IdMode::GenerateNew)
        .unwrap();
    tx.insert(vec![far_road], IdMode::GenerateNew).unwrap();
    tx.commit().unwrap();

    let envelope = store.envelope("Road").unwrap().unwrap();
    assert_eq!(envelope, loam::Envelope::new(0.0, 0.0, 110.0, 120.0));

    // No Person features were inserted
    assert!(store.envelope("Person").unwrap().is_none());
}

/// Counting with no residual goes through `COUNT(*)`; with a residual the
/// cursor drains.
#[test]
fn count_with_and_without_residual() {
    let store = support::blob_store(Arc::new(NullCache));

    let mut tx = store.transaction().unwrap();
    for name in ["a", "b", "c"] {
        tx.insert(vec![support::road(name, None)], IdMode::GenerateNew)
            .unwrap();
    }
    tx.commit().unwrap();

    assert_eq!(store.count(Query::new("Road")).unwrap(), 3);
    assert_eq!(store.count(Query::new("Person")).unwrap(), 0);

    let filtered = Query::new("Road").filter(loam_core::stmt::Expr::eq(
        loam_core::stmt::Expr::property("name"),
        loam_core::stmt::Expr::value("b"),
    ));
    assert_eq!(store.count(filtered).unwrap(), 1);
}

/// Deleting by filter removes payload rows and reports the feature count.
#[test]
fn delete_by_residual_filter() {
    let store = support::blob_store(Arc::new(NullCache));

    let mut tx = store.transaction().unwrap();
    for name in ["a", "b", "a"] {
        let mut road = support::road("Road", None);
        road.push_property("grade", PropertyValue::Primitive(Value::from(name)));
        tx.insert(vec![road], IdMode::GenerateNew).unwrap();
    }
    tx.commit().unwrap();

    let mut tx = store.transaction().unwrap();
    let deleted = tx
        .delete(
            "Road",
            Some(loam_core::stmt::Expr::eq(
                loam_core::stmt::Expr::property("grade"),
                loam_core::stmt::Expr::value("a"),
            )),
        )
        .unwrap();
    tx.commit().unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(store.count(Query::new("Road")).unwrap(), 1);
}

/// Abandoning a lazy cursor early releases its resources and later queries
/// still work.
#[test]
fn early_cursor_abandonment() {
    let store = support::blob_store(Arc::new(NullCache));

    let mut tx = store.transaction().unwrap();
    for name in ["a", "b", "c"] {
        tx.insert(vec![support::road(name, None)], IdMode::GenerateNew)
            .unwrap();
    }
    tx.commit().unwrap();

    {
        let mut cursor = store.query(Query::new("Road")).unwrap();
        let first: Option<loam::Result<Arc<Feature>>> = cursor.next();
        assert!(first.unwrap().is_ok());
        // Cursor dropped here with rows remaining
    }

    assert_eq!(store.count(Query::new("Road")).unwrap(), 3);
}
