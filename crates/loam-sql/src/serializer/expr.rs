use super::{Delimited, Formatter, Ident, Params, ToSql};

use crate::stmt::{ColumnRef, Expr};

impl ToSql for &Expr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use Expr::*;

        match self {
            And(operands) => {
                fmt!(f, Delimited(operands, " AND "));
            }
            Between { expr, low, high } => {
                fmt!(f, &**expr " BETWEEN " {&**low} " AND " {&**high});
            }
            BinaryOp { lhs, op, rhs } => {
                fmt!(f, &**lhs " " op " " {&**rhs});
            }
            Column(column) => column.to_sql(f),
            Func { name, args } => {
                if args.is_empty() {
                    fmt!(f, name.as_str() "(*)");
                } else {
                    fmt!(f, name.as_str() "(" super::Comma(args) ")");
                }
            }
            InList { expr, list } => {
                fmt!(f, &**expr " IN (" super::Comma(list) ")");
            }
            IsNull { expr, negate } => {
                if *negate {
                    fmt!(f, &**expr " IS NOT NULL");
                } else {
                    fmt!(f, &**expr " IS NULL");
                }
            }
            Like { expr, pattern } => {
                let pattern_value = loam_core::stmt::Value::String(pattern.clone());
                fmt!(f, &**expr " LIKE " {&pattern_value});
                if pattern.contains('\\') {
                    fmt!(f, " ESCAPE '\\'");
                }
            }
            Not(operand) => {
                fmt!(f, "NOT (" {&**operand} ")");
            }
            Or(operands) => {
                // Parenthesized so OR groups compose under enclosing ANDs
                fmt!(f, "(" Delimited(operands, " OR ") ")");
            }
            Value(value) => value.to_sql(f),
        }
    }
}

impl ToSql for &ColumnRef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if let Some(table) = &self.table {
            fmt!(f, Ident(table) "." Ident(&self.column));
        } else {
            fmt!(f, Ident(&self.column));
        }
    }
}
