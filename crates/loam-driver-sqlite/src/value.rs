use loam_core::stmt::{Type, Value};

use rusqlite::types::{ToSqlOutput, ValueRef};

/// Bridges loam values to rusqlite's parameter binding.
pub(crate) struct SqliteValue<'a>(pub(crate) &'a Value);

impl rusqlite::ToSql for SqliteValue<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Bool(v) => ToSqlOutput::Owned((*v as i64).into()),
            Value::I32(v) => ToSqlOutput::Owned((*v as i64).into()),
            Value::I64(v) => ToSqlOutput::Owned((*v).into()),
            Value::F64(v) => ToSqlOutput::Owned((*v).into()),
            Value::String(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Value::Bytes(v) => ToSqlOutput::Borrowed(ValueRef::Blob(v)),
        })
    }
}

/// Decodes one result column, driven by the expected type.
pub(crate) fn from_sql(row: &rusqlite::Row<'_>, index: usize, ty: &Type) -> rusqlite::Result<Value> {
    Ok(match ty {
        Type::Bool => match row.get::<_, Option<bool>>(index)? {
            Some(v) => Value::Bool(v),
            None => Value::Null,
        },
        Type::I32 => match row.get::<_, Option<i32>>(index)? {
            Some(v) => Value::I32(v),
            None => Value::Null,
        },
        Type::I64 => match row.get::<_, Option<i64>>(index)? {
            Some(v) => Value::I64(v),
            None => Value::Null,
        },
        Type::F64 => match row.get::<_, Option<f64>>(index)? {
            Some(v) => Value::F64(v),
            None => Value::Null,
        },
        Type::Text => match row.get::<_, Option<String>>(index)? {
            Some(v) => Value::String(v),
            None => Value::Null,
        },
        Type::Bytes => match row.get::<_, Option<Vec<u8>>>(index)? {
            Some(v) => Value::Bytes(v),
            None => Value::Null,
        },
    })
}
