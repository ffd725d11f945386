mod support;

use loam::{IdMode, PropertyValue, Query};
use loam_core::stmt::{Expr, OrderBy, Page, Value};

/// Relational round trip: materialize(flatten(f)) == f for every mapped
/// property, modulo id assignment and unmapped properties.
#[test]
fn materialize_of_flatten_preserves_mapped_properties() {
    let store = support::relational_store();

    let original = support::road("Main Street", None);

    let mut tx = store.transaction().unwrap();
    let ids = tx
        .insert(vec![original.clone()], IdMode::GenerateNew)
        .unwrap();
    tx.commit().unwrap();

    let fetched = store.get_by_id(&ids[0]).unwrap().unwrap();

    assert_eq!(fetched.type_name, "Road");
    assert_eq!(fetched.id.as_ref(), Some(&ids[0]));

    // Geometry: bytes, storage CRS tag, and the codec-computed envelope
    match fetched.property("geom") {
        Some(PropertyValue::Geometry(geometry)) => {
            assert_eq!(geometry.data, vec![1, 2, 3, 4]);
            assert_eq!(geometry.crs.as_str(), support::STORAGE_CRS);
            assert_eq!(
                geometry.envelope,
                Some(loam::Envelope::new(0.0, 0.0, 10.0, 5.0))
            );
        }
        other => panic!("expected a geometry, got {other:?}"),
    }

    assert_eq!(
        fetched.property("name"),
        Some(&PropertyValue::Primitive(Value::from("Main Street")))
    );
    assert_eq!(
        fetched.property("lanes"),
        Some(&PropertyValue::Primitive(Value::I32(2)))
    );

    match fetched.property("address") {
        Some(PropertyValue::Complex(children)) => {
            assert_eq!(children[0].name, "street");
            assert_eq!(
                children[0].value,
                PropertyValue::Primitive(Value::from("Hauptstrasse"))
            );
            assert_eq!(children[1].name, "city");
            assert_eq!(
                children[1].value,
                PropertyValue::Primitive(Value::from("Bonn"))
            );
        }
        other => panic!("expected a structured address, got {other:?}"),
    }
}

/// Sort and paging push into SQL when every key is mapped.
#[test]
fn mapped_sort_and_paging_push_into_sql() {
    let store = support::relational_store();

    let mut tx = store.transaction().unwrap();
    for name in ["Cherry Lane", "Apple Road", "Birch Way"] {
        tx.insert(vec![support::road(name, None)], IdMode::GenerateNew)
            .unwrap();
    }
    tx.commit().unwrap();

    let names = |query: Query| -> Vec<String> {
        store
            .query(query)
            .unwrap()
            .map(|f| {
                match f.unwrap().property("name") {
                    Some(PropertyValue::Primitive(Value::String(name))) => name.clone(),
                    other => panic!("unexpected name: {other:?}"),
                }
            })
            .collect()
    };

    assert_eq!(
        names(Query::new("Road").order_by(OrderBy::asc("name"))),
        ["Apple Road", "Birch Way", "Cherry Lane"]
    );
    assert_eq!(
        names(
            Query::new("Road")
                .order_by(OrderBy::desc("name"))
                .page(Page::limit(1).with_offset(1))
        ),
        ["Birch Way"]
    );
}

/// Comparisons, LIKE, BETWEEN, IS NULL and dotted compound paths all
/// translate against mapped columns.
#[test]
fn mapped_predicates_translate() {
    let store = support::relational_store();

    let mut tx = store.transaction().unwrap();
    for (name, lanes) in [("Apple Road", 2), ("Birch Way", 4)] {
        let mut road = support::road(name, None);
        road.properties[2].value = PropertyValue::Primitive(Value::I32(lanes));
        tx.insert(vec![road], IdMode::GenerateNew).unwrap();
    }
    tx.commit().unwrap();

    let count = |filter| store.count(Query::new("Road").filter(filter)).unwrap();

    assert_eq!(count(Expr::like("name", "%Road")), 1);
    assert_eq!(
        count(Expr::between(
            Expr::property("lanes"),
            Expr::value(3),
            Expr::value(5)
        )),
        1
    );
    assert_eq!(count(Expr::is_not_null("name")), 2);
    assert_eq!(
        count(Expr::eq(
            Expr::property("address.city"),
            Expr::value("Bonn")
        )),
        2
    );
    assert_eq!(
        count(Expr::or([
            Expr::eq(Expr::property("name"), Expr::value("Apple Road")),
            Expr::eq(Expr::property("name"), Expr::value("Birch Way")),
        ])),
        2
    );
}

/// A filter on a join-chained feature reference emits a LEFT OUTER JOIN
/// and rewrites the document-level id into the target's id-kernel.
#[test]
fn filter_on_joined_feature_reference() {
    let store = support::relational_store();

    let mut tx = store.transaction().unwrap();
    let alice = std::sync::Arc::new(support::person("Alice"));
    tx.insert(
        vec![support::road("Main Street", Some(loam::FeatureRef::Resolved(alice)))],
        IdMode::GenerateNew,
    )
    .unwrap();
    tx.insert(vec![support::road("Side Street", None)], IdMode::GenerateNew)
        .unwrap();
    tx.commit().unwrap();

    // Find Alice's generated id first
    let people: Vec<_> = store
        .query(Query::new("Person"))
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();
    let alice_id = people[0].id.clone().unwrap();

    let owned: Vec<_> = store
        .query(Query::new("Road").filter(Expr::eq(
            Expr::property("owner"),
            Expr::value(alice_id.as_str()),
        )))
        .unwrap()
        .collect::<loam::Result<_>>()
        .unwrap();

    assert_eq!(owned.len(), 1);
    assert_eq!(
        owned[0].property("name"),
        Some(&PropertyValue::Primitive(Value::from("Main Street")))
    );
}
