mod value;
use value::SqliteValue;

use rusqlite::Connection as RusqliteConnection;
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
    sync::Mutex,
};
use url::Url;

use loam_core::{
    driver::{Driver, Row, Rows, SqlDialect},
    stmt::{Type, Value},
    Error, Result,
};

/// SQLite connector.
#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),

    /// A shared-cache in-memory database. The anchor connection keeps the
    /// database alive between units of work, since each query or
    /// transaction opens (and closes) its own connection.
    InMemory {
        uri: String,
        anchor: Mutex<RusqliteConnection>,
    },
}

static IN_MEMORY_ID: AtomicUsize = AtomicUsize::new(0);

impl Sqlite {
    /// Create a new SQLite driver from a connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver_operation_failed)?;

        if url.scheme() != "sqlite" {
            return Err(Error::unsupported(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Self::in_memory()
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Result<Self> {
        let id = IN_MEMORY_ID.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:loam_mem_{id}?mode=memory&cache=shared");
        let anchor = RusqliteConnection::open(&uri).map_err(Error::driver_operation_failed)?;
        Ok(Self::InMemory {
            uri,
            anchor: Mutex::new(anchor),
        })
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

impl Driver for Sqlite {
    fn url(&self) -> Cow<'_, str> {
        match self {
            Sqlite::InMemory { .. } => Cow::Borrowed("sqlite::memory:"),
            Sqlite::File(path) => Cow::Owned(format!("sqlite:{}", path.display())),
        }
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn connect(&self) -> Result<Box<dyn loam_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory { uri, .. } => Connection::open(uri)?,
        };
        Ok(Box::new(connection))
    }
}

pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        Ok(Self { connection })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Ok(Self { connection })
    }
}

impl loam_core::Connection for Connection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut stmt = self
            .connection
            .prepare_cached(sql)
            .map_err(Error::driver_operation_failed)?;

        let params: Vec<SqliteValue<'_>> = params.iter().map(SqliteValue).collect();
        let count = stmt
            .execute(rusqlite::params_from_iter(params.iter()))
            .map_err(Error::driver_operation_failed)?;

        Ok(count as u64)
    }

    fn query(&mut self, sql: &str, params: &[Value], tys: &[Type]) -> Result<Rows> {
        let mut stmt = self
            .connection
            .prepare_cached(sql)
            .map_err(Error::driver_operation_failed)?;

        let params: Vec<SqliteValue<'_>> = params.iter().map(SqliteValue).collect();
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(Error::driver_operation_failed)?;

        // rusqlite ties cursors to statement lifetimes, so each statement's
        // rows are drained eagerly; the single-pass cursor contract is
        // enforced at the engine surface.
        let mut ret = vec![];
        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut items = Vec::with_capacity(tys.len());
                    for (index, ty) in tys.iter().enumerate() {
                        items.push(
                            value::from_sql(row, index, ty)
                                .map_err(Error::driver_operation_failed)?,
                        );
                    }
                    ret.push(Row::from_vec(items));
                }
                Ok(None) => break,
                Err(err) => return Err(Error::driver_operation_failed(err)),
            }
        }

        Ok(Rows::from_vec(ret))
    }

    fn last_insert_key(&mut self) -> Result<Value> {
        Ok(Value::I64(self.connection.last_insert_rowid()))
    }

    fn begin(&mut self) -> Result<()> {
        self.connection
            .execute("BEGIN", [])
            .map_err(Error::driver_operation_failed)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.connection
            .execute("COMMIT", [])
            .map_err(Error::driver_operation_failed)?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.connection
            .execute("ROLLBACK", [])
            .map_err(Error::driver_operation_failed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_core::Connection as _;

    #[test]
    fn execute_and_query_round_trip() {
        let mut conn = Connection::in_memory().unwrap();

        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", &[])
            .unwrap();
        conn.execute(
            "INSERT INTO t (id, name) VALUES (?1, ?2)",
            &[Value::I64(1), Value::from("first")],
        )
        .unwrap();

        let rows = conn
            .query(
                "SELECT id, name FROM t",
                &[],
                &[Type::I64, Type::Text],
            )
            .unwrap();

        let rows: Vec<_> = rows.collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(*rows[0].get(0), Value::I64(1));
        assert_eq!(*rows[0].get(1), Value::from("first"));
    }

    #[test]
    fn null_columns_decode_to_null() {
        let mut conn = Connection::in_memory().unwrap();

        conn.execute("CREATE TABLE t (id INTEGER, name TEXT)", &[])
            .unwrap();
        conn.execute(
            "INSERT INTO t (id, name) VALUES (?1, ?2)",
            &[Value::I64(1), Value::Null],
        )
        .unwrap();

        let rows: Vec<_> = conn
            .query("SELECT name FROM t", &[], &[Type::Text])
            .unwrap()
            .collect();
        assert_eq!(*rows[0].get(0), Value::Null);
    }

    #[test]
    fn last_insert_key_reports_generated_rowid() {
        let mut conn = Connection::in_memory().unwrap();

        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", &[])
            .unwrap();
        conn.execute("INSERT INTO t (name) VALUES (?1)", &[Value::from("x")])
            .unwrap();

        assert_eq!(conn.last_insert_key().unwrap(), Value::I64(1));
    }

    #[test]
    fn rollback_discards_uncommitted_rows() {
        let mut conn = Connection::in_memory().unwrap();

        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &[])
            .unwrap();

        conn.begin().unwrap();
        conn.execute("INSERT INTO t (id) VALUES (1)", &[]).unwrap();
        conn.rollback().unwrap();

        let rows: Vec<_> = conn
            .query("SELECT id FROM t", &[], &[Type::I64])
            .unwrap()
            .collect();
        assert!(rows.is_empty());
    }
}
