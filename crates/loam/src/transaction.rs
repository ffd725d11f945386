use crate::engine::{self, insert::IdMode, EngineContext};
use crate::query::Query;

use loam_core::driver::Connection;
use loam_core::feature::{Feature, FeatureId};
use loam_core::stmt::Expr;
use loam_core::{err, Result};

/// One write transaction on its own connection.
///
/// Any failed operation rolls the whole transaction back and poisons it;
/// partial success is never exposed. An unfinished transaction rolls back
/// on drop.
pub struct Transaction {
    cx: EngineContext,
    conn: Box<dyn Connection>,
    finished: bool,
}

impl Transaction {
    pub(crate) fn new(cx: EngineContext, conn: Box<dyn Connection>) -> Transaction {
        Transaction {
            cx,
            conn,
            finished: false,
        }
    }

    /// Inserts a feature graph, returning the newly assigned root ids.
    pub fn insert(&mut self, features: Vec<Feature>, mode: IdMode) -> Result<Vec<FeatureId>> {
        self.check_open()?;
        match engine::insert::execute(&self.cx, &mut *self.conn, features, mode) {
            Ok(ids) => Ok(ids),
            Err(err) => {
                self.abort();
                Err(err)
            }
        }
    }

    /// Deletes the features of one type matching the filter. Returns the
    /// number of features removed.
    pub fn delete(&mut self, type_name: &str, filter: Option<Expr>) -> Result<u64> {
        self.check_open()?;

        let mut query = Query::new(type_name);
        query.filter = filter;

        match engine::delete::execute(&self.cx, &mut *self.conn, &query) {
            Ok(count) => Ok(count),
            Err(err) => {
                self.abort();
                Err(err)
            }
        }
    }

    pub fn commit(mut self) -> Result<()> {
        self.check_open()?;
        self.finished = true;
        self.conn.commit()
    }

    pub fn rollback(mut self) -> Result<()> {
        self.check_open()?;
        self.finished = true;
        self.conn.rollback()
    }

    fn check_open(&self) -> Result<()> {
        if self.finished {
            return Err(err!("transaction already finished or rolled back"));
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.finished = true;
        if let Err(err) = self.conn.rollback() {
            tracing::warn!(%err, "rollback after failed operation also failed");
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.conn.rollback();
        }
    }
}
