mod support;

use loam::schema::{app, Builder};
use loam::{Feature, IdMode, PropertyValue, Store};
use loam_core::stmt::{Type, Value};
use loam_core::Connection as _;
use loam_driver_sqlite::Sqlite;

/// Two properties whose values land in the same related table.
fn tagged_schema() -> loam::Schema {
    let app = app::Schema::new().push(
        app::FeatureType::new("Road")
            .table("ROAD")
            .fid(app::FidDecl::default().column("ID").ty("long").prefix("ROAD_"))
            .property(
                app::Property::primitive("category", "string")
                    .expr("TAG")
                    .join(app::JoinDecl::step("ROAD_TAG", "ID", "ROAD_ID")),
            )
            .property(
                app::Property::primitive("label", "string")
                    .expr("TAG")
                    .join(app::JoinDecl::step("ROAD_TAG", "ID", "ROAD_ID")),
            ),
    );
    Builder::new().build(app).unwrap()
}

fn store() -> (Store, Box<dyn loam_core::Connection>) {
    let driver = Sqlite::in_memory().unwrap();
    let mut conn = loam_core::driver::Driver::connect(&driver).unwrap();
    conn.execute("CREATE TABLE ROAD (ID INTEGER PRIMARY KEY)", &[])
        .unwrap();
    conn.execute("CREATE TABLE ROAD_TAG (ROAD_ID INTEGER, TAG TEXT)", &[])
        .unwrap();

    let store = Store::builder()
        .schema(tagged_schema())
        .driver(driver)
        .build()
        .unwrap();
    (store, conn)
}

/// Value-identical non-feature rows from distinct property paths merge into
/// one row, with links redirected to the survivor.
#[test]
fn identical_property_rows_merge() {
    let (store, mut check) = store();

    let mut road = Feature::new("Road");
    road.push_property("category", PropertyValue::Primitive(Value::from("scenic")));
    road.push_property("label", PropertyValue::Primitive(Value::from("scenic")));

    let mut tx = store.transaction().unwrap();
    tx.insert(vec![road], IdMode::GenerateNew).unwrap();
    tx.commit().unwrap();

    let mut rows = check
        .query("SELECT COUNT(*) FROM ROAD_TAG", &[], &[Type::I64])
        .unwrap();
    assert_eq!(*rows.next().unwrap().get(0), Value::I64(1));
}

/// Rows that differ in any non-key column stay separate.
#[test]
fn distinct_property_rows_stay_separate() {
    let (store, mut check) = store();

    let mut road = Feature::new("Road");
    road.push_property("category", PropertyValue::Primitive(Value::from("scenic")));
    road.push_property("label", PropertyValue::Primitive(Value::from("bumpy")));

    let mut tx = store.transaction().unwrap();
    tx.insert(vec![road], IdMode::GenerateNew).unwrap();
    tx.commit().unwrap();

    let mut rows = check
        .query("SELECT COUNT(*) FROM ROAD_TAG", &[], &[Type::I64])
        .unwrap();
    assert_eq!(*rows.next().unwrap().get(0), Value::I64(2));
}

/// Feature rows never merge, even when their non-key columns are identical.
#[test]
fn feature_rows_never_merge() {
    let (store, mut check) = store();

    let a = Feature::new("Road");
    let b = Feature::new("Road");

    let mut tx = store.transaction().unwrap();
    let ids = tx.insert(vec![a, b], IdMode::GenerateNew).unwrap();
    tx.commit().unwrap();

    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    let mut rows = check
        .query("SELECT COUNT(*) FROM ROAD", &[], &[Type::I64])
        .unwrap();
    assert_eq!(*rows.next().unwrap().get(0), Value::I64(2));
}
