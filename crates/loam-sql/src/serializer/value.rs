use super::{Formatter, Params, ToSql};

use loam_core::stmt::{BinaryOp, Value};

impl ToSql for &Value {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let placeholder = f.params.push(self);
        placeholder.to_sql(f);
    }
}

impl ToSql for &BinaryOp {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        use std::fmt::Write;

        write!(f.dst, "{self}").unwrap();
    }
}
