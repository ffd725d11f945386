use super::*;

/// An operator filter tree, evaluated against features of a single type.
///
/// Filters are compiled to SQL where the mapping model can reach the
/// referenced properties; fragments it cannot reach degrade to residual
/// in-memory evaluation (see the query translator).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of expressions
    And(ExprAnd),

    /// A bounding-box predicate against a geometry property
    Bbox(ExprBbox),

    /// Range check, inclusive on both ends
    Between(ExprBetween),

    /// Binary comparison
    BinaryOp(ExprBinaryOp),

    /// Whether an expression is (or is not) null. Kept separate from the
    /// binary operators because of how databases treat null comparisons.
    IsNull(ExprIsNull),

    /// Pattern match with `%` / `_` wildcards
    Like(ExprLike),

    /// Negation
    Not(ExprNot),

    /// OR a set of expressions
    Or(ExprOr),

    /// References a property of the queried feature type
    Property(ExprProperty),

    /// A constant value
    Value(Value),
}

impl Expr {
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    pub fn property(path: impl Into<Path>) -> Self {
        ExprProperty { path: path.into() }.into()
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(..))
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Self::Property(..))
    }

    /// The property path when the expression is a property reference.
    pub fn as_property(&self) -> Option<&Path> {
        match self {
            Self::Property(expr) => Some(&expr.path),
            _ => None,
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}
