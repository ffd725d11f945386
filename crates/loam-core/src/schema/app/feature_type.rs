use super::Property;

/// Declaration of one feature type.
#[derive(Debug, Clone)]
pub struct FeatureType {
    pub name: String,
    pub is_abstract: bool,

    /// Explicit table name; derived from the type name otherwise.
    pub table: Option<String>,

    /// Explicit fid column convention; defaults apply otherwise.
    pub fid: Option<FidDecl>,

    pub properties: Vec<Property>,
}

/// Declaration of the fid column.
#[derive(Debug, Clone, Default)]
pub struct FidDecl {
    pub column: Option<String>,

    /// Primitive-type token, e.g. `string` or `long`.
    pub ty: Option<String>,

    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl FeatureType {
    pub fn new(name: impl Into<String>) -> FeatureType {
        FeatureType {
            name: name.into(),
            is_abstract: false,
            table: None,
            fid: None,
            properties: vec![],
        }
    }

    pub fn is_abstract(mut self) -> FeatureType {
        self.is_abstract = true;
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> FeatureType {
        self.table = Some(table.into());
        self
    }

    pub fn fid(mut self, fid: FidDecl) -> FeatureType {
        self.fid = Some(fid);
        self
    }

    pub fn property(mut self, property: Property) -> FeatureType {
        self.properties.push(property);
        self
    }
}

impl FidDecl {
    pub fn column(mut self, column: impl Into<String>) -> FidDecl {
        self.column = Some(column.into());
        self
    }

    pub fn ty(mut self, ty: impl Into<String>) -> FidDecl {
        self.ty = Some(ty.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> FidDecl {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> FidDecl {
        self.suffix = Some(suffix.into());
        self
    }
}
