pub mod app;

mod builder;
pub use builder::Builder;

pub mod db;

mod expr_parse;

pub mod mapping;
pub use mapping::{
    FeatureTypeMapping, FidMapping, JoinChain, JoinStep, Mapping, MappingExpression,
};

use crate::feature::FeatureId;
use crate::stmt::{self, Path};
use crate::{Error, Result};

use indexmap::IndexMap;

/// The compiled schema: one [`FeatureTypeMapping`] per configured feature
/// type, the optional BLOB-table descriptor, and the storage mode derived
/// from the configuration.
///
/// Built once by [`Builder`], read-only afterwards. Safe to share across
/// arbitrarily many concurrent callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Feature type mappings, in declaration order.
    pub types: IndexMap<String, FeatureTypeMapping>,

    /// The BLOB-table descriptor, present in BLOB and hybrid mode.
    pub blob: Option<BlobMapping>,

    /// Derived storage mode.
    pub mode: StorageMode,

    /// Derived table layout, used by the insert engine and for bookkeeping.
    pub db: db::Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Features persist as opaque payloads in the shared BLOB table.
    Blob,

    /// Each mapped property persists in its own column/table.
    Relational,

    /// Both strategies combined for the same feature types.
    Hybrid,
}

impl StorageMode {
    /// True when the schema carries the shared BLOB table.
    pub fn is_blob_backed(self) -> bool {
        matches!(self, StorageMode::Blob | StorageMode::Hybrid)
    }

    /// True when per-property relational mappings exist.
    pub fn is_relational(self) -> bool {
        matches!(self, StorageMode::Relational | StorageMode::Hybrid)
    }
}

/// The shared BLOB table: id, type discriminator, payload, and the indexed
/// bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobMapping {
    pub table: String,
    pub id_column: String,
    pub type_column: String,
    pub payload_column: String,
    pub bbox: BboxColumns,
}

/// Bounding-box columns of the BLOB table, kept as four scalar columns so
/// coarse spatial prefilters stay plain indexed comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct BboxColumns {
    pub min_x: String,
    pub min_y: String,
    pub max_x: String,
    pub max_y: String,
}

impl BlobMapping {
    pub(crate) fn with_defaults(table: Option<String>) -> BlobMapping {
        BlobMapping {
            table: table.unwrap_or_else(|| "gml_objects".to_string()),
            id_column: "gml_id".to_string(),
            type_column: "ft_type".to_string(),
            payload_column: "binary_object".to_string(),
            bbox: BboxColumns {
                min_x: "bbox_min_x".to_string(),
                min_y: "bbox_min_y".to_string(),
                max_x: "bbox_max_x".to_string(),
                max_y: "bbox_max_y".to_string(),
            },
        }
    }
}

impl Schema {
    /// Looks up a feature type by name.
    pub fn feature_type(&self, name: &str) -> Result<&FeatureTypeMapping> {
        self.types
            .get(name)
            .ok_or_else(|| Error::unsupported(format!("unknown feature type `{name}`")))
    }

    /// Resolves a property path for a feature type to its mapping.
    ///
    /// Unknown paths are `None`, not an error: unmapped properties are
    /// silently skipped by both the query and insert paths.
    pub fn resolve(&self, type_name: &str, path: &Path) -> Option<&Mapping> {
        self.types.get(type_name)?.resolve(path)
    }

    /// Analyzes a feature id into its feature type and storage-local
    /// id-kernel, by matching each type's prefix/suffix convention.
    pub fn analyze_id(&self, id: &FeatureId) -> Result<(&FeatureTypeMapping, stmt::Value)> {
        for mapping in self.types.values() {
            if let Some(kernel) = mapping.fid.parse_id(id)? {
                return Ok((mapping, kernel));
            }
        }

        Err(Error::unsupported(format!(
            "feature id `{id}` does not match any feature type's id convention"
        )))
    }

    /// The feature type assigned the given discriminator value.
    pub fn feature_type_by_discriminator(&self, type_id: u16) -> Option<&FeatureTypeMapping> {
        self.types.values().find(|t| t.type_id == type_id)
    }

    pub(crate) fn verify(&self) -> Result<()> {
        if self.types.is_empty() {
            return Err(Error::invalid_schema("no feature types declared"));
        }

        for mapping in self.types.values() {
            let relational = !mapping.properties.is_empty();
            if !relational && self.blob.is_none() {
                return Err(Error::invalid_schema(format!(
                    "feature type `{}` has neither a BLOB descriptor nor relational mappings",
                    mapping.name
                )));
            }
        }

        Ok(())
    }
}
