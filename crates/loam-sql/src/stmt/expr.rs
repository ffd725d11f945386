use loam_core::stmt::{BinaryOp, Value};

/// A SQL expression with every identifier already resolved.
///
/// The query translator resolves property paths through the mapping model
/// before anything reaches this tree; the serializer only renders.
#[derive(Debug, Clone)]
pub enum Expr {
    And(Vec<Expr>),

    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },

    BinaryOp {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },

    /// An alias-qualified column reference
    Column(ColumnRef),

    /// A function application, e.g. `lower(...)`, `COUNT(*)` (empty args),
    /// `MIN(...)`
    Func {
        name: String,
        args: Vec<Expr>,
    },

    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
    },

    IsNull {
        expr: Box<Expr>,
        negate: bool,
    },

    Like {
        expr: Box<Expr>,
        pattern: String,
    },

    Not(Box<Expr>),

    Or(Vec<Expr>),

    /// A constant; rendered as a placeholder with the value pushed onto the
    /// parameter list
    Value(Value),
}

#[derive(Debug, Clone)]
pub struct ColumnRef {
    /// The table alias the column is qualified with, when the statement
    /// aliases its tables.
    pub table: Option<String>,

    pub column: String,
}

impl Expr {
    pub fn column(table: Option<&str>, column: impl Into<String>) -> Expr {
        Expr::Column(ColumnRef {
            table: table.map(str::to_string),
            column: column.into(),
        })
    }

    pub fn value(value: impl Into<Value>) -> Expr {
        Expr::Value(value.into())
    }

    pub fn binary_op(lhs: Expr, op: BinaryOp, rhs: Expr) -> Expr {
        Expr::BinaryOp {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Eq, rhs)
    }

    pub fn count_star() -> Expr {
        Expr::Func {
            name: "COUNT".to_string(),
            args: vec![],
        }
    }

    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Func {
            name: name.into(),
            args,
        }
    }
}
