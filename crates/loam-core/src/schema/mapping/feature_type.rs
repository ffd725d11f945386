use super::Mapping;
use crate::feature::FeatureId;
use crate::stmt::{Path, Type, Value};
use crate::Result;

use indexmap::IndexMap;

/// The mapping of one feature type onto its relational representation.
///
/// Created once per configured feature type at schema-build time; immutable
/// thereafter; owned by the [`Schema`](crate::Schema).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTypeMapping {
    /// Name of the feature type.
    pub name: String,

    /// Sequential discriminator, stable across schema reloads that only
    /// append new types. Stored in the BLOB table's type column.
    pub type_id: u16,

    /// Whether the type is abstract (never instantiated, only queried
    /// through concrete subtypes declared elsewhere).
    pub is_abstract: bool,

    /// The feature's own table. `None` in pure-BLOB configurations.
    pub table: Option<String>,

    /// The primary-key (fid) column description.
    pub fid: FidMapping,

    /// Property name → mapping, in declaration order.
    pub properties: IndexMap<String, Mapping>,
}

/// The fid column: name, value type, and the optional string prefix/suffix
/// convention that turns a storage-local id-kernel into a document-level
/// feature id.
#[derive(Debug, Clone, PartialEq)]
pub struct FidMapping {
    pub column: String,
    pub ty: Type,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl FeatureTypeMapping {
    /// Resolves a property path to its mapping.
    ///
    /// Unknown paths yield `None` ("unmapped"), never an error; unmapped
    /// properties are skipped by both the query and insert paths.
    pub fn resolve(&self, path: &Path) -> Option<&Mapping> {
        let (first, rest) = path.split_first()?;
        self.properties.get(first)?.resolve(rest)
    }
}

impl FidMapping {
    /// Renders a storage-local id-kernel into a document-level feature id.
    pub fn format_id(&self, kernel: &Value) -> FeatureId {
        let mut ret = String::new();
        if let Some(prefix) = &self.prefix {
            ret.push_str(prefix);
        }
        match kernel {
            Value::String(s) => ret.push_str(s),
            Value::I32(v) => ret.push_str(&v.to_string()),
            Value::I64(v) => ret.push_str(&v.to_string()),
            other => ret.push_str(&format!("{other:?}")),
        }
        if let Some(suffix) = &self.suffix {
            ret.push_str(suffix);
        }
        FeatureId::new(ret)
    }

    /// Recovers the storage-local id-kernel from a document-level feature
    /// id, or `None` when the id does not follow this type's convention.
    pub fn parse_id(&self, id: &FeatureId) -> Result<Option<Value>> {
        let mut raw = id.as_str();

        if let Some(prefix) = &self.prefix {
            match raw.strip_prefix(prefix.as_str()) {
                Some(rest) => raw = rest,
                None => return Ok(None),
            }
        }
        if let Some(suffix) = &self.suffix {
            match raw.strip_suffix(suffix.as_str()) {
                Some(rest) => raw = rest,
                None => return Ok(None),
            }
        }

        Ok(match self.ty {
            Type::I32 => raw.parse::<i32>().ok().map(Value::I32),
            Type::I64 => raw.parse::<i64>().ok().map(Value::I64),
            Type::Text => Some(Value::String(raw.to_string())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fid() -> FidMapping {
        FidMapping {
            column: "id".to_string(),
            ty: Type::I64,
            prefix: Some("ROAD_".to_string()),
            suffix: None,
        }
    }

    #[test]
    fn format_and_parse_round_trip() {
        let fid = fid();
        let id = fid.format_id(&Value::I64(42));
        assert_eq!(id.as_str(), "ROAD_42");
        assert_eq!(fid.parse_id(&id).unwrap(), Some(Value::I64(42)));
    }

    #[test]
    fn parse_rejects_foreign_prefix() {
        let fid = fid();
        assert_eq!(
            fid.parse_id(&FeatureId::new("PERSON_42")).unwrap(),
            None
        );
    }

    #[test]
    fn parse_rejects_non_numeric_kernel() {
        let fid = fid();
        assert_eq!(fid.parse_id(&FeatureId::new("ROAD_abc")).unwrap(), None);
    }
}
