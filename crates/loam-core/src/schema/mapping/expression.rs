use crate::schema::expr_parse;
use crate::Result;

use std::fmt;

/// The leaf of every mapping variant: either a literal column reference or a
/// small computed expression parsed from the mapping language.
///
/// Computed expressions are read-only: the query path serializes them into
/// SQL, the insert path skips them.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingExpression {
    /// A literal column reference, optionally table-qualified.
    Column(ColumnRef),

    /// A function applied to argument expressions, e.g. `lower(name)`.
    Function {
        name: String,
        args: Vec<MappingExpression>,
    },

    /// A quoted string constant.
    Constant(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl MappingExpression {
    /// Parses a mapping-language string. Malformed input is a configuration
    /// error.
    pub fn parse(input: &str) -> Result<MappingExpression> {
        expr_parse::parse(input)
    }

    pub fn column(name: impl Into<String>) -> MappingExpression {
        MappingExpression::Column(ColumnRef {
            table: None,
            column: name.into(),
        })
    }

    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            MappingExpression::Column(column) => Some(column),
            _ => None,
        }
    }

    /// True when the expression is a plain column that the insert path can
    /// write through.
    pub fn is_column(&self) -> bool {
        matches!(self, MappingExpression::Column(_))
    }
}

impl fmt::Display for MappingExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingExpression::Column(ColumnRef { table, column }) => {
                if let Some(table) = table {
                    write!(f, "{table}.{column}")
                } else {
                    f.write_str(column)
                }
            }
            MappingExpression::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt(f)?;
                }
                f.write_str(")")
            }
            MappingExpression::Constant(value) => write!(f, "'{value}'"),
        }
    }
}
