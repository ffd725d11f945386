use super::Expr;

#[derive(Debug, Clone)]
pub struct Insert {
    pub table: String,

    /// Column names, index-aligned with `values`.
    pub columns: Vec<String>,

    pub values: Vec<Expr>,
}

impl Insert {
    pub fn new(table: impl Into<String>) -> Insert {
        Insert {
            table: table.into(),
            columns: vec![],
            values: vec![],
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: Expr) {
        self.columns.push(column.into());
        self.values.push(value);
    }
}
