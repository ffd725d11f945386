use super::{Comma, Formatter, Ident, Params, ToSql};

use crate::stmt::{Delete, Insert, Join, OrderByColumn, Select, Statement, TableWithJoins};

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Statement::Delete(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Select(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if self.distinct {
            fmt!(f, "SELECT DISTINCT " Comma(&self.columns) " FROM " {&self.from});
        } else {
            fmt!(f, "SELECT " Comma(&self.columns) " FROM " {&self.from});
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }

        if let Some(limit) = self.limit {
            fmt!(f, " LIMIT " limit);
        }

        if let Some(offset) = self.offset {
            fmt!(f, " OFFSET " offset);
        }
    }
}

impl ToSql for &TableWithJoins {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(&self.table));

        if let Some(alias) = &self.alias {
            fmt!(f, " AS " Ident(alias));
        }

        for join in &self.joins {
            fmt!(f, join);
        }
    }
}

impl ToSql for &Join {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, " LEFT OUTER JOIN " Ident(&self.table) " AS " Ident(&self.alias) " ON " {&self.on});
    }
}

impl ToSql for &OrderByColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, &self.expr);
        if self.desc {
            fmt!(f, " DESC");
        }
    }
}

impl ToSql for &Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let columns = self.columns.iter().map(Ident);

        fmt!(
            f,
            "INSERT INTO " Ident(&self.table)
            " (" Comma(columns) ") VALUES (" Comma(&self.values) ")"
        );
    }
}

impl ToSql for &Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "DELETE FROM " Ident(&self.table));

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}
