use super::{Expr, Path};

/// References a property of the queried feature type.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprProperty {
    pub path: Path,
}

impl From<ExprProperty> for Expr {
    fn from(value: ExprProperty) -> Self {
        Self::Property(value)
    }
}
