//! Shared fixtures for the store tests: schemas, table DDL, and line-format
//! test codecs standing in for the external GML machinery.

#![allow(dead_code)]

use loam::schema::{app, Builder};
use loam::{
    Crs, Envelope, Feature, FeatureId, FeatureRef, Geometry, GeometryCodec, PayloadCodec,
    Property, PropertyValue, ReferenceResolver, Schema,
};
use loam_core::stmt::Value;
use loam_core::Connection as _;
use loam_driver_sqlite::Sqlite;

use std::sync::Arc;

pub const STORAGE_CRS: &str = "EPSG:4326";

/// The Road/Person schema: `Road` with table `ROAD`, fid column `ID`
/// (integer kernel, `ROAD_` prefix), a geometry, a couple of scalars, a
/// structured address, and an `owner` reference to `Person` through the
/// `ROAD_OWNER` join table.
pub fn road_schema() -> Schema {
    Builder::new().build(road_declarations()).unwrap()
}

/// Same declarations with BLOB storage added (hybrid mode).
pub fn road_schema_hybrid() -> Schema {
    Builder::new().build(road_declarations().with_blob()).unwrap()
}

/// BLOB-only storage: the same two types, no property mappings.
pub fn road_schema_blob() -> Schema {
    let app = app::Schema::new()
        .with_blob()
        .push(app::FeatureType::new("Road"))
        .push(app::FeatureType::new("Person"));
    Builder::new().build(app).unwrap()
}

fn road_declarations() -> app::Schema {
    app::Schema::new()
        .push(
            app::FeatureType::new("Person")
                .table("PERSON")
                .fid(app::FidDecl::default().column("ID").ty("long").prefix("PERSON_"))
                .property(app::Property::primitive("name", "string").expr("NAME")),
        )
        .push(
            app::FeatureType::new("Road")
                .table("ROAD")
                .fid(app::FidDecl::default().column("ID").ty("long").prefix("ROAD_"))
                .property(app::Property::geometry("geom", "curve", STORAGE_CRS).expr("GEOM"))
                .property(app::Property::primitive("name", "string").expr("NAME"))
                .property(app::Property::primitive("lanes", "int").expr("LANES"))
                .property(app::Property::compound(
                    "address",
                    vec![
                        app::Property::primitive("street", "string"),
                        app::Property::primitive("city", "string"),
                    ],
                ))
                .property(app::Property::feature("owner", "Person").join(
                    app::JoinDecl::step("ROAD_OWNER", "ID", "ROAD_ID").then(
                        "PERSON",
                        "PERSON_ID",
                        "ID",
                    ),
                )),
        )
}

/// Relational tables for the Road/Person schema. Fid columns are TEXT when
/// the schema is BLOB-backed (hybrid stores id-kernels as text).
pub fn create_road_tables(driver: &Sqlite, text_fids: bool) {
    let fid_ty = if text_fids { "TEXT" } else { "INTEGER" };
    let mut conn = loam_core::driver::Driver::connect(driver).unwrap();
    for ddl in [
        format!(
            "CREATE TABLE PERSON (ID {fid_ty} PRIMARY KEY, NAME TEXT)"
        ),
        format!(
            "CREATE TABLE ROAD (ID {fid_ty} PRIMARY KEY, GEOM BLOB, NAME TEXT, LANES INTEGER, \
             address_street TEXT, address_city TEXT)"
        ),
        format!("CREATE TABLE ROAD_OWNER (ROAD_ID {fid_ty}, PERSON_ID {fid_ty})"),
    ] {
        conn.execute(&ddl, &[]).unwrap();
    }
}

pub fn create_blob_table(driver: &Sqlite) {
    let mut conn = loam_core::driver::Driver::connect(driver).unwrap();
    conn.execute(
        "CREATE TABLE gml_objects (gml_id TEXT PRIMARY KEY, ft_type INTEGER, \
         binary_object BLOB, bbox_min_x REAL, bbox_min_y REAL, bbox_max_x REAL, \
         bbox_max_y REAL)",
        &[],
    )
    .unwrap();
}

// ---------------------------------------------------------------------------
// Feature fixtures
// ---------------------------------------------------------------------------

pub fn line_geometry(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Geometry {
    Geometry {
        id: None,
        data: vec![1, 2, 3, 4],
        crs: Crs::new(STORAGE_CRS),
        envelope: Some(Envelope::new(min_x, min_y, max_x, max_y)),
    }
}

pub fn person(name: &str) -> Feature {
    let mut person = Feature::new("Person");
    person.push_property("name", PropertyValue::Primitive(Value::from(name)));
    person
}

pub fn road(name: &str, owner: Option<FeatureRef>) -> Feature {
    let mut road = Feature::new("Road");
    road.push_property("geom", PropertyValue::Geometry(line_geometry(0.0, 0.0, 10.0, 5.0)));
    road.push_property("name", PropertyValue::Primitive(Value::from(name)));
    road.push_property("lanes", PropertyValue::Primitive(Value::I32(2)));
    road.push_property(
        "address",
        PropertyValue::Complex(vec![
            Property {
                name: "street".to_string(),
                value: PropertyValue::Primitive(Value::from("Hauptstrasse")),
            },
            Property {
                name: "city".to_string(),
                value: PropertyValue::Primitive(Value::from("Bonn")),
            },
        ]),
    );
    if let Some(owner) = owner {
        road.push_property("owner", PropertyValue::Feature(owner));
    }
    road
}

// ---------------------------------------------------------------------------
// Test codecs: a line-oriented text format, deterministic and pure
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TestGeometryCodec;

impl GeometryCodec for TestGeometryCodec {
    fn encode(&self, geometry: &Geometry, _crs: &Crs) -> loam::Result<Vec<u8>> {
        let envelope = geometry.envelope.unwrap_or(Envelope::new(0.0, 0.0, 0.0, 0.0));
        let mut out = vec![];
        for bound in [envelope.min_x, envelope.min_y, envelope.max_x, envelope.max_y] {
            out.extend_from_slice(&bound.to_le_bytes());
        }
        out.extend_from_slice(&geometry.data);
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> loam::Result<Geometry> {
        if data.len() < 32 {
            return Err(loam::Error::codec("geometry payload too short"));
        }
        let mut bounds = [0.0f64; 4];
        for (index, bound) in bounds.iter_mut().enumerate() {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&data[index * 8..index * 8 + 8]);
            *bound = f64::from_le_bytes(bytes);
        }
        Ok(Geometry {
            id: None,
            data: data[32..].to_vec(),
            crs: Crs::new(""),
            envelope: Some(Envelope::new(bounds[0], bounds[1], bounds[2], bounds[3])),
        })
    }
}

#[derive(Debug, Default)]
pub struct TestPayloadCodec;

impl PayloadCodec for TestPayloadCodec {
    fn encode(&self, feature: &Feature, crs: &Crs) -> loam::Result<Vec<u8>> {
        let mut out = String::new();
        encode_feature(&mut out, feature, crs)?;
        Ok(out.into_bytes())
    }

    fn decode(
        &self,
        data: &[u8],
        _schema: &Schema,
        _crs: &Crs,
        _resolver: &dyn ReferenceResolver,
    ) -> loam::Result<Feature> {
        let text = std::str::from_utf8(data)
            .map_err(|_| loam::Error::codec("payload is not valid UTF-8"))?;
        decode_feature(text)
    }
}

fn encode_feature(out: &mut String, feature: &Feature, crs: &Crs) -> loam::Result<()> {
    use std::fmt::Write;

    let id = feature.id.as_ref().map(FeatureId::as_str).unwrap_or("-");
    writeln!(out, "F|{}|{id}", feature.type_name).unwrap();
    encode_properties(out, &feature.properties, crs, 0)?;
    Ok(())
}

fn encode_properties(
    out: &mut String,
    properties: &[Property],
    crs: &Crs,
    depth: usize,
) -> loam::Result<()> {
    use std::fmt::Write;

    for property in properties {
        let name = &property.name;
        match &property.value {
            PropertyValue::Primitive(value) => {
                let (tag, text) = match value {
                    Value::String(v) => ('S', v.clone()),
                    Value::I32(v) => ('i', v.to_string()),
                    Value::I64(v) => ('I', v.to_string()),
                    Value::F64(v) => ('D', v.to_string()),
                    Value::Bool(v) => ('B', v.to_string()),
                    other => {
                        return Err(loam::Error::codec(format!(
                            "cannot encode {} values",
                            other.variant_name()
                        )))
                    }
                };
                writeln!(out, "{depth}|P|{name}|{tag}|{text}").unwrap();
            }
            PropertyValue::Geometry(geometry) => {
                let encoded = TestGeometryCodec.encode(geometry, crs)?;
                writeln!(out, "{depth}|G|{name}|{}|{}", geometry.crs, hex(&encoded)).unwrap();
            }
            PropertyValue::Feature(reference) => {
                let id = reference
                    .id()
                    .ok_or_else(|| loam::Error::codec("reference without an id"))?;
                writeln!(out, "{depth}|R|{name}|{id}").unwrap();
            }
            PropertyValue::Complex(children) => {
                writeln!(out, "{depth}|C|{name}|{}", children.len()).unwrap();
                encode_properties(out, children, crs, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn decode_feature(text: &str) -> loam::Result<Feature> {
    let mut lines = text.lines();
    let header = lines.next().ok_or_else(|| loam::Error::codec("empty payload"))?;
    let mut parts = header.split('|');
    let (Some("F"), Some(type_name), Some(id)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(loam::Error::codec("malformed payload header"));
    };

    let mut feature = Feature::new(type_name);
    if id != "-" {
        feature.id = Some(FeatureId::new(id));
    }

    let lines: Vec<&str> = lines.collect();
    let mut index = 0;
    feature.properties = decode_properties(&lines, &mut index, 0)?;
    Ok(feature)
}

fn decode_properties(
    lines: &[&str],
    index: &mut usize,
    depth: usize,
) -> loam::Result<Vec<Property>> {
    let mut properties = vec![];

    while *index < lines.len() {
        let mut parts = lines[*index].split('|');
        let line_depth: usize = parts
            .next()
            .and_then(|d| d.parse().ok())
            .ok_or_else(|| loam::Error::codec("malformed payload line"))?;
        if line_depth < depth {
            break;
        }
        *index += 1;

        let kind = parts.next().unwrap_or("");
        let name = parts.next().unwrap_or("").to_string();
        let value = match kind {
            "P" => {
                let tag = parts.next().unwrap_or("");
                let text = parts.next().unwrap_or("");
                let value = match tag {
                    "S" => Value::from(text),
                    "i" => Value::I32(text.parse().map_err(|_| loam::Error::codec("bad i32"))?),
                    "I" => Value::I64(text.parse().map_err(|_| loam::Error::codec("bad i64"))?),
                    "D" => Value::F64(text.parse().map_err(|_| loam::Error::codec("bad f64"))?),
                    "B" => Value::Bool(text == "true"),
                    _ => return Err(loam::Error::codec("unknown scalar tag")),
                };
                PropertyValue::Primitive(value)
            }
            "G" => {
                let crs = parts.next().unwrap_or("");
                let data = unhex(parts.next().unwrap_or(""))?;
                let mut geometry = TestGeometryCodec.decode(&data)?;
                geometry.crs = Crs::new(crs);
                PropertyValue::Geometry(geometry)
            }
            "R" => {
                let id = parts.next().unwrap_or("");
                PropertyValue::Feature(FeatureRef::Unresolved(FeatureId::new(id)))
            }
            "C" => {
                let children = decode_properties(lines, index, depth + 1)?;
                PropertyValue::Complex(children)
            }
            _ => return Err(loam::Error::codec("unknown payload line kind")),
        };

        properties.push(Property { name, value });
    }

    Ok(properties)
}

fn hex(data: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        write!(out, "{byte:02x}").unwrap();
    }
    out
}

fn unhex(text: &str) -> loam::Result<Vec<u8>> {
    if text.len() % 2 != 0 {
        return Err(loam::Error::codec("odd hex payload"));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&text[i..i + 2], 16)
                .map_err(|_| loam::Error::codec("bad hex payload"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Store assembly
// ---------------------------------------------------------------------------

pub fn relational_store() -> loam::Store {
    let driver = Sqlite::in_memory().unwrap();
    create_road_tables(&driver, false);
    loam::Store::builder()
        .schema(road_schema())
        .driver(driver)
        .geometry_codec(Arc::new(TestGeometryCodec))
        .build()
        .unwrap()
}

pub fn blob_store(cache: Arc<dyn loam::FeatureCache>) -> loam::Store {
    let driver = Sqlite::in_memory().unwrap();
    create_blob_table(&driver);
    loam::Store::builder()
        .schema(road_schema_blob())
        .driver(driver)
        .cache(cache)
        .geometry_codec(Arc::new(TestGeometryCodec))
        .payload_codec(Arc::new(TestPayloadCodec))
        .build()
        .unwrap()
}

pub fn hybrid_store() -> loam::Store {
    let driver = Sqlite::in_memory().unwrap();
    create_road_tables(&driver, true);
    create_blob_table(&driver);
    loam::Store::builder()
        .schema(road_schema_hybrid())
        .driver(driver)
        .geometry_codec(Arc::new(TestGeometryCodec))
        .payload_codec(Arc::new(TestPayloadCodec))
        .build()
        .unwrap()
}
