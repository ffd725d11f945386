use super::{Expr, Path};

#[derive(Debug, Clone, PartialEq)]
pub struct ExprIsNull {
    pub property: Path,
    pub negate: bool,
}

impl Expr {
    pub fn is_null(property: impl Into<Path>) -> Self {
        ExprIsNull {
            property: property.into(),
            negate: false,
        }
        .into()
    }

    pub fn is_not_null(property: impl Into<Path>) -> Self {
        ExprIsNull {
            property: property.into(),
            negate: true,
        }
        .into()
    }
}

impl From<ExprIsNull> for Expr {
    fn from(value: ExprIsNull) -> Self {
        Self::IsNull(value)
    }
}
