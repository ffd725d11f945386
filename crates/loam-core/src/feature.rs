use crate::stmt::Value;

use std::fmt;
use std::sync::Arc;

/// A schema-typed record, possibly containing nested features, geometries,
/// and scalar properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// The feature id. Absent until assigned by the insert engine (or the
    /// document that produced the feature).
    pub id: Option<FeatureId>,

    /// Name of the feature type, as declared in the schema.
    pub type_name: String,

    /// Properties in document order. A property name may repeat for
    /// many-valued properties.
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A scalar value
    Primitive(Value),

    /// A geometry value
    Geometry(Geometry),

    /// A reference to another feature
    Feature(FeatureRef),

    /// A structured value with child properties
    Complex(Vec<Property>),
}

/// A reference to another feature, either carried inline in the document or
/// by id only.
///
/// By-id references are not eagerly followed; they are resolved on demand
/// through the schema's reference resolver. This keeps single-feature
/// fetches from fanning out into unbounded graph traversals, and it is how
/// documents express cycles (at least one side of a cycle is by id).
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureRef {
    Resolved(Arc<Feature>),
    Unresolved(FeatureId),
}

impl FeatureRef {
    /// The referenced feature's id, when known.
    pub fn id(&self) -> Option<&FeatureId> {
        match self {
            FeatureRef::Resolved(feature) => feature.id.as_ref(),
            FeatureRef::Unresolved(id) => Some(id),
        }
    }

    pub fn as_resolved(&self) -> Option<&Arc<Feature>> {
        match self {
            FeatureRef::Resolved(feature) => Some(feature),
            FeatureRef::Unresolved(_) => None,
        }
    }
}

/// A feature identifier as it appears in documents, e.g. `ROAD_42`.
///
/// The storage-local part (the id-kernel) is recovered by stripping the
/// feature type's prefix/suffix convention; that analysis lives on the
/// schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureId(String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> FeatureId {
        FeatureId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeatureId {
    fn from(src: &str) -> FeatureId {
        FeatureId(src.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(src: String) -> FeatureId {
        FeatureId(src)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A coordinate reference system identifier, e.g. `EPSG:4326`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crs(String);

impl Crs {
    pub fn new(id: impl Into<String>) -> Crs {
        Crs(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A geometry value.
///
/// The wire encoding is opaque to the engine; all interpretation goes
/// through the injected geometry codec. The envelope is carried alongside so
/// that bounding-box predicates and the BLOB table's indexed bounding-box
/// columns never need to decode the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Geometry id, when the document assigned one. Assigned by the insert
    /// engine otherwise.
    pub id: Option<String>,

    /// Encoded geometry bytes.
    pub data: Vec<u8>,

    /// The coordinate reference system the encoded bytes are expressed in.
    pub crs: Crs,

    /// The geometry's bounding box, when known.
    pub envelope: Option<Envelope>,
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Envelope {
        Envelope {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// The smallest envelope containing both inputs.
    pub fn union(&self, other: &Envelope) -> Envelope {
        Envelope {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

impl Feature {
    pub fn new(type_name: impl Into<String>) -> Feature {
        Feature {
            id: None,
            type_name: type_name.into(),
            properties: vec![],
        }
    }

    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Feature {
        self.id = Some(id.into());
        self
    }

    pub fn push_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.push(Property {
            name: name.into(),
            value,
        });
    }

    /// The first property with the given name.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// All properties with the given name, in document order.
    pub fn properties_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a PropertyValue> + 'a {
        self.properties
            .iter()
            .filter(move |p| p.name == name)
            .map(|p| &p.value)
    }

    /// The first geometry-valued property.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.properties.iter().find_map(|p| match &p.value {
            PropertyValue::Geometry(geometry) => Some(geometry),
            _ => None,
        })
    }

    /// The union of the envelopes of all geometry properties.
    pub fn envelope(&self) -> Option<Envelope> {
        let mut ret: Option<Envelope> = None;
        for property in &self.properties {
            if let PropertyValue::Geometry(geometry) = &property.value {
                if let Some(env) = &geometry.envelope {
                    ret = Some(match ret {
                        Some(acc) => acc.union(env),
                        None => *env,
                    });
                }
            }
        }
        ret
    }
}
