use loam_core::schema::{app, Builder, Mapping};
use loam_core::stmt::Path;

fn schema() -> loam_core::Schema {
    let app = app::Schema::new().push(
        app::FeatureType::new("Road")
            .property(app::Property::primitive("name", "string"))
            .property(app::Property::compound(
                "address",
                vec![app::Property::primitive("street", "string")],
            )),
    );
    Builder::new().build(app).unwrap()
}

#[test]
fn resolves_top_level_property() {
    let schema = schema();
    assert!(matches!(
        schema.resolve("Road", &Path::parse("name")),
        Some(Mapping::Primitive(_))
    ));
}

#[test]
fn resolves_dotted_path_through_compound() {
    let schema = schema();
    assert!(matches!(
        schema.resolve("Road", &Path::parse("address.street")),
        Some(Mapping::Primitive(_))
    ));
    assert!(matches!(
        schema.resolve("Road", &Path::parse("address")),
        Some(Mapping::Compound(_))
    ));
}

#[test]
fn unmapped_path_is_none_not_an_error() {
    let schema = schema();
    assert!(schema.resolve("Road", &Path::parse("note")).is_none());
    assert!(schema
        .resolve("Road", &Path::parse("address.zipcode"))
        .is_none());
    assert!(schema
        .resolve("Road", &Path::parse("name.too.deep"))
        .is_none());
}

#[test]
fn unknown_feature_type_is_an_error() {
    let schema = schema();
    let err = schema.feature_type("Bridge").unwrap_err();
    assert!(err.is_unsupported());
}
