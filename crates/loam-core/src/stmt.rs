mod eval;
pub use eval::property_value;

mod expr;
pub use expr::Expr;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_bbox;
pub use expr_bbox::ExprBbox;

mod expr_between;
pub use expr_between::ExprBetween;

mod expr_binary_op;
pub use expr_binary_op::ExprBinaryOp;

mod expr_is_null;
pub use expr_is_null::ExprIsNull;

mod expr_like;
pub use expr_like::ExprLike;

mod expr_not;
pub use expr_not::ExprNot;

mod expr_or;
pub use expr_or::ExprOr;

mod expr_property;
pub use expr_property::ExprProperty;

mod op_binary;
pub use op_binary::BinaryOp;

mod order_by;
pub use order_by::{OrderBy, OrderByExpr};

mod page;
pub use page::Page;

mod path;
pub use path::Path;

mod ty;
pub use ty::Type;

mod value;
pub use value::Value;
