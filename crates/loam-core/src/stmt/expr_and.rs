use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct ExprAnd {
    pub operands: Vec<Expr>,
}

impl Expr {
    pub fn and(operands: impl IntoIterator<Item = Expr>) -> Self {
        ExprAnd {
            operands: operands.into_iter().collect(),
        }
        .into()
    }
}

impl From<ExprAnd> for Expr {
    fn from(value: ExprAnd) -> Self {
        Self::And(value)
    }
}
