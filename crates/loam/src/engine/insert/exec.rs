use super::row::{RowId, RowSet, RowValue};
use crate::engine::EngineContext;

use loam_core::driver::Connection;
use loam_core::stmt::Value;
use loam_core::{err, Result};
use loam_sql::stmt as sql;

/// Executes the ordered rows on the transaction's connection. Link values
/// resolve to the target row's key as each statement is built.
pub(crate) fn execute(
    cx: &EngineContext,
    conn: &mut dyn Connection,
    rows: &RowSet,
    order: &[RowId],
) -> Result<()> {
    let serializer = cx.serializer();

    for &id in order {
        let row = rows.get(id);

        let mut insert = sql::Insert::new(row.table.clone());
        for (column, value) in &row.columns {
            let value = match value {
                RowValue::Value(value) => value.clone(),
                RowValue::Link(target) => resolve_link(rows, *target)?,
            };
            insert.push(column.clone(), sql::Expr::Value(value));
        }

        let mut params: Vec<Value> = vec![];
        let statement = serializer.serialize(&loam_sql::Statement::Insert(insert), &mut params);

        tracing::debug!(sql = %statement, table = %row.table, "insert row");
        conn.execute(&statement, &params)?;
    }

    Ok(())
}

fn resolve_link(rows: &RowSet, target: RowId) -> Result<Value> {
    let target = rows.get(target);
    match &target.key {
        Some(key) => Ok(key.value.clone()),
        None => Err(err!("linked `{}` row has no key column", target.table)),
    }
}
