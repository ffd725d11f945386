use super::Column;

/// A database table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Name of the table
    pub name: String,

    /// The table's columns
    pub columns: Vec<Column>,

    /// Index of the primary-key column, when the table has one
    pub primary_key: Option<usize>,
}

impl Table {
    pub(crate) fn new(name: String) -> Table {
        Table {
            name,
            columns: vec![],
            primary_key: None,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key_column(&self) -> Option<&Column> {
        self.columns.get(self.primary_key?)
    }

    pub(crate) fn push_column(&mut self, column: Column) {
        // Shared property tables are visited once per referencing mapping
        if self.column(&column.name).is_none() {
            self.columns.push(column);
        }
    }
}
