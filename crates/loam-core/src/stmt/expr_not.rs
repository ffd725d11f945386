use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct ExprNot {
    pub operand: Box<Expr>,
}

impl Expr {
    pub fn not(operand: impl Into<Expr>) -> Self {
        ExprNot {
            operand: Box::new(operand.into()),
        }
        .into()
    }
}

impl From<ExprNot> for Expr {
    fn from(value: ExprNot) -> Self {
        Self::Not(value)
    }
}
