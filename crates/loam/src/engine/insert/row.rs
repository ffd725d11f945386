use indexmap::IndexMap;
use loam_core::stmt::Value;

/// Index of a row in the transaction's [`RowSet`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct RowId(pub usize);

/// A column value, either concrete or linked to another row's key.
///
/// Links are the deferred-resolve edges of the insert dependency graph:
/// they are replaced with the target row's key value at execution time,
/// which makes forward references and cycles representable.
#[derive(Debug, Clone)]
pub(crate) enum RowValue {
    Value(Value),
    Link(RowId),
}

/// The key column other rows may link to.
#[derive(Debug, Clone)]
pub(crate) struct RowKey {
    pub column: String,
    pub value: Value,
}

/// One row awaiting insertion. Transaction-local; discarded after the
/// transaction commits or rolls back.
#[derive(Debug)]
pub(crate) struct InsertRow {
    pub table: String,

    /// Column name → value, in set order.
    pub columns: IndexMap<String, RowValue>,

    pub key: Option<RowKey>,

    /// Feature (and BLOB payload) rows carry freshly assigned unique ids
    /// and are never merged by deduplication.
    pub is_feature: bool,

    /// Explicit ordering dependency in addition to link edges: the BLOB
    /// payload row precedes the feature's relational rows.
    pub after: Option<RowId>,

    /// Tombstone set by deduplication; merged rows are skipped by ordering
    /// and execution.
    pub merged: bool,
}

impl InsertRow {
    pub(crate) fn new(table: impl Into<String>) -> InsertRow {
        InsertRow {
            table: table.into(),
            columns: IndexMap::new(),
            key: None,
            is_feature: false,
            after: None,
            merged: false,
        }
    }

    pub(crate) fn set(&mut self, column: &str, value: RowValue) {
        self.columns.insert(column.to_string(), value);
    }

    /// Row ids this row links to, plus the explicit ordering dependency.
    pub(crate) fn dependencies(&self) -> impl Iterator<Item = RowId> + '_ {
        self.columns
            .values()
            .filter_map(|value| match value {
                RowValue::Link(target) => Some(*target),
                RowValue::Value(_) => None,
            })
            .chain(self.after)
    }
}

/// Arena of flattened rows, indexed by stable identity.
#[derive(Debug, Default)]
pub(crate) struct RowSet {
    rows: Vec<InsertRow>,
}

impl RowSet {
    pub(crate) fn push(&mut self, row: InsertRow) -> RowId {
        self.rows.push(row);
        RowId(self.rows.len() - 1)
    }

    pub(crate) fn get(&self, id: RowId) -> &InsertRow {
        &self.rows[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: RowId) -> &mut InsertRow {
        &mut self.rows[id.0]
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (RowId, &InsertRow)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| (RowId(index), row))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (RowId, &mut InsertRow)> + '_ {
        self.rows
            .iter_mut()
            .enumerate()
            .map(|(index, row)| (RowId(index), row))
    }
}
