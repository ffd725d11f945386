mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{ColumnRef, Expr};

mod insert;
pub use insert::Insert;

mod select;
pub use select::{OrderByColumn, Select};

mod table_with_joins;
pub use table_with_joins::{Join, TableWithJoins};

/// A statement as structured data: an ordered tree of SQL fragments and
/// typed parameters.
///
/// Alias generation, join emission, and parameter binding stay
/// index-consistent because the statement is assembled as data and rendered
/// in one pass by the serializer.
#[derive(Debug, Clone)]
pub enum Statement {
    Delete(Delete),
    Insert(Insert),
    Select(Select),
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Self::Delete(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Self::Select(value)
    }
}
