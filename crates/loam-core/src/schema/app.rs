//! Declarative feature-type descriptions, the input to the schema builder.
//!
//! These mirror what the external GML/XML schema parser produces: names,
//! optional table/id-column conventions, and per-property declarations
//! carrying small mapping-expression strings.

mod feature_type;
pub use feature_type::{FeatureType, FidDecl};

mod property;
pub use property::{JoinDecl, JoinStepDecl, Property, PropertyKind};

/// The full set of declarations handed to the builder.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub feature_types: Vec<FeatureType>,

    /// Present when the configuration asks for BLOB (or hybrid) storage.
    pub blob: Option<BlobDecl>,
}

#[derive(Debug, Clone, Default)]
pub struct BlobDecl {
    /// Explicit BLOB table name; a default is derived otherwise.
    pub table: Option<String>,
}

impl Schema {
    pub fn new() -> Schema {
        Schema::default()
    }

    pub fn with_blob(mut self) -> Schema {
        self.blob = Some(BlobDecl::default());
        self
    }

    pub fn push(mut self, feature_type: FeatureType) -> Schema {
        self.feature_types.push(feature_type);
        self
    }
}
