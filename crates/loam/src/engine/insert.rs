//! The transactional graph-insert engine.
//!
//! A feature/geometry object graph is decomposed into a dependency-ordered,
//! deduplicated set of relational rows and executed inside the enclosing
//! transaction:
//!
//! 1. walk the graph depth-first, collecting distinct features by identity
//!    in document order (`walk`);
//! 2. assign ids per the id mode (`walk`);
//! 3. flatten each feature into rows, linking foreign keys to other rows'
//!    keys through placeholders that tolerate forward references and cycles
//!    (`flatten`);
//! 4. merge structurally identical non-feature rows, redirecting links
//!    (`dedup`);
//! 5. order rows so referenced rows execute before referencing rows
//!    (`order`);
//! 6. execute the rows in order (`exec`).
//!
//! Any failure aborts the entire transaction; partial success is never
//! exposed.

mod dedup;
mod exec;
mod flatten;
mod order;
mod row;
mod walk;

use super::EngineContext;
use loam_core::driver::Connection;
use loam_core::feature::{Feature, FeatureId};
use loam_core::{Error, Result};

/// How feature and geometry ids are treated on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMode {
    /// Replace every id with a freshly generated one.
    GenerateNew,

    /// Keep ids carried by the document; generate ids only where missing.
    UseExisting,

    /// Replace rows whose ids already exist. Not implemented; insert fails
    /// fast.
    ReplaceDuplicate,
}

pub(crate) fn execute(
    cx: &EngineContext,
    conn: &mut dyn Connection,
    roots: Vec<Feature>,
    mode: IdMode,
) -> Result<Vec<FeatureId>> {
    if mode == IdMode::ReplaceDuplicate {
        return Err(Error::unsupported(
            "REPLACE_DUPLICATE id handling is not implemented",
        ));
    }

    let mut graph = walk::collect(roots);
    let root_ids = walk::assign_ids(cx, &mut graph, mode)?;

    let mut rows = flatten::flatten(cx, &graph)?;
    dedup::merge_duplicates(&mut rows);
    let order = order::order(&rows);
    exec::execute(cx, conn, &rows, &order)?;

    Ok(root_ids)
}
