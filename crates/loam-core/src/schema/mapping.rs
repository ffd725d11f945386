mod expression;
pub use expression::{ColumnRef, MappingExpression};

mod feature_type;
pub use feature_type::{FeatureTypeMapping, FidMapping};

mod join_chain;
pub use join_chain::{JoinChain, JoinStep};

use crate::feature::Crs;
use crate::stmt::Type;
use crate::{Error, Result};

use indexmap::IndexMap;

/// The compiled, typed description of how one property is stored.
///
/// A sum type matched exhaustively by every consumer (builder, query
/// translator, insert engine): adding a variant gets compile-time coverage
/// everywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    /// Property → scalar expression + primitive type tag
    Primitive(PrimitiveMapping),

    /// Property → geometry column + subtype, dimensionality, and storage CRS
    Geometry(GeometryMapping),

    /// Property → reference to another feature
    Feature(FeatureMapping),

    /// Property → ordered child mappings for structured values
    Compound(CompoundMapping),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveMapping {
    pub expr: MappingExpression,
    pub ty: Type,
    pub join: Option<JoinChain>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryMapping {
    pub expr: MappingExpression,
    pub kind: GeometryKind,
    pub dim: u8,
    pub crs: Crs,
    pub join: Option<JoinChain>,
}

/// Reference to another feature, either through a foreign-key column on the
/// feature's own table (`key`) or through a join table (`join` with two
/// steps).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMapping {
    /// Name of the referenced feature type.
    pub target: String,

    /// The foreign-key expression on the feature's own table. `None` when
    /// the relation lives in a join table.
    pub key: Option<MappingExpression>,

    pub join: Option<JoinChain>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundMapping {
    /// Child mappings keyed by their relative path segment, in declaration
    /// order.
    pub children: IndexMap<String, Mapping>,

    pub join: Option<JoinChain>,
}

/// Declared geometry subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    Curve,
    Surface,
    Solid,
    Any,
}

impl GeometryKind {
    /// Parses a geometry-kind token from a property declaration. An unknown
    /// token aborts schema construction.
    pub fn from_token(token: &str) -> Result<GeometryKind> {
        Ok(match token {
            "point" => GeometryKind::Point,
            "curve" | "line" => GeometryKind::Curve,
            "surface" | "polygon" => GeometryKind::Surface,
            "solid" => GeometryKind::Solid,
            "geometry" | "any" => GeometryKind::Any,
            _ => {
                return Err(Error::invalid_schema(format!(
                    "unknown geometry kind `{token}`"
                )))
            }
        })
    }
}

impl Mapping {
    /// The join chain to the table holding this property's value, when it is
    /// not stored in the feature's own table.
    pub fn join(&self) -> Option<&JoinChain> {
        match self {
            Mapping::Primitive(m) => m.join.as_ref(),
            Mapping::Geometry(m) => m.join.as_ref(),
            Mapping::Feature(m) => m.join.as_ref(),
            Mapping::Compound(m) => m.join.as_ref(),
        }
    }

    /// Resolves the remaining path segments relative to this mapping.
    pub fn resolve(&self, segments: &[String]) -> Option<&Mapping> {
        let [first, rest @ ..] = segments else {
            return Some(self);
        };

        match self {
            Mapping::Compound(compound) => compound.children.get(first)?.resolve(rest),
            _ => None,
        }
    }
}
