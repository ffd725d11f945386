//! The seam to the underlying relational engine.
//!
//! The engine is request-scoped and single-threaded per unit of work: one
//! query or one write transaction owns exactly one [`Connection`] for its
//! duration. All calls here block; there is no cooperative scheduling and no
//! background work.

use crate::stmt::{Type, Value};
use crate::Result;

use std::borrow::Cow;

/// A database connector. Hands out one connection per logical unit of work.
pub trait Driver: Send + Sync + std::fmt::Debug {
    /// The connection URL this driver was configured with.
    fn url(&self) -> Cow<'_, str>;

    /// The SQL dialect statements for this database are rendered in.
    fn dialect(&self) -> SqlDialect;

    fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// The SQL dialects the engine can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgresql,
    Sqlite,
}

/// One open database connection.
///
/// The transaction model is deliberately plain: the underlying engine
/// supplies atomic commit/rollback; constraint ordering is resolved at the
/// mapping level, not by the database.
pub trait Connection: Send {
    /// Executes a statement that returns no rows. Returns the affected row
    /// count.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Executes a query. `tys` gives the expected type of each selected
    /// column, in order; drivers use it to decode values.
    fn query(&mut self, sql: &str, params: &[Value], tys: &[Type]) -> Result<Rows>;

    /// The key generated by the most recent insert on this connection.
    fn last_insert_key(&mut self) -> Result<Value>;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;
}

/// A forward-only, single-pass sequence of result rows.
///
/// Drivers may buffer the statement's rows when the underlying library ties
/// cursors to statement lifetimes; the single-pass contract is what callers
/// rely on.
#[derive(Debug)]
pub struct Rows {
    inner: std::vec::IntoIter<Row>,
}

impl Rows {
    pub fn from_vec(rows: Vec<Row>) -> Rows {
        Rows {
            inner: rows.into_iter(),
        }
    }

    pub fn empty() -> Rows {
        Rows::from_vec(vec![])
    }
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.inner.next()
    }
}

/// One result row.
#[derive(Debug)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn from_vec(values: Vec<Value>) -> Row {
        Row { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> &Value {
        &self.values[index]
    }

    /// Moves the value out of the row, leaving `Null` behind.
    pub fn take(&mut self, index: usize) -> Value {
        std::mem::take(&mut self.values[index])
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
