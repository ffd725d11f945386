//! Identifier-list queries bypass the general translator: ids are analyzed
//! into (feature type, id-kernel) pairs; BLOB-backed storage stages the
//! kernels in a temporary table and joins, relational storage issues one
//! parametrized IN-list statement for the single addressed type.

use super::materialize::{BlobPlan, MaterializePlan};
use super::translate;
use super::EngineContext;

use loam_core::driver::{Connection, Rows};
use loam_core::feature::FeatureId;
use loam_core::stmt::{Type, Value};
use loam_core::{Error, Result};
use loam_sql::stmt as sql;

use indexmap::IndexMap;

const STAGE_TABLE: &str = "loam_id_filter";

pub(crate) fn run_id_query(
    cx: &EngineContext,
    conn: &mut dyn Connection,
    ids: &[FeatureId],
) -> Result<(Rows, MaterializePlan)> {
    let schema = &cx.schema;

    // Analyze ids into (feature type, id-kernel) pairs, preserving request
    // order within each type.
    let mut groups: IndexMap<String, Vec<Value>> = IndexMap::new();
    for id in ids {
        let (mapping, kernel) = schema.analyze_id(id)?;
        groups.entry(mapping.name.clone()).or_default().push(kernel);
    }

    if schema.mode.is_blob_backed() {
        return blob_staged(cx, conn, &groups);
    }

    if groups.len() > 1 {
        return Err(Error::unsupported(format!(
            "id filter spans {} feature types; relational storage resolves ids against \
             exactly one type per query",
            groups.len()
        )));
    }

    let (type_name, kernels) = groups.into_iter().next().unwrap();
    let mapping = schema.feature_type(&type_name)?;

    let mut base = translate::relational_base(schema, mapping, cx.dialect)?;
    base.select.filter = Some(sql::Expr::InList {
        expr: Box::new(sql::Expr::column(Some(&base.root), &mapping.fid.column)),
        list: kernels.into_iter().map(sql::Expr::Value).collect(),
    });

    let mut params: Vec<Value> = vec![];
    let sql = cx
        .serializer()
        .serialize(&loam_sql::Statement::Select(base.select), &mut params);

    let rows = conn.query(&sql, &params, &base.tys)?;
    Ok((rows, MaterializePlan::Relational(base.plan)))
}

/// Stages the id set into a temporary table and joins it against the BLOB
/// table. The statement selects the type discriminator so mixed-type id sets
/// materialize correctly.
fn blob_staged(
    cx: &EngineContext,
    conn: &mut dyn Connection,
    groups: &IndexMap<String, Vec<Value>>,
) -> Result<(Rows, MaterializePlan)> {
    let blob = cx
        .schema
        .blob
        .as_ref()
        .ok_or_else(|| Error::invalid_schema("BLOB storage without a BLOB table descriptor"))?;

    conn.execute(
        &format!(r#"CREATE TEMPORARY TABLE IF NOT EXISTS "{STAGE_TABLE}" ("id" TEXT)"#),
        &[],
    )?;
    conn.execute(&format!(r#"DELETE FROM "{STAGE_TABLE}""#), &[])?;

    for kernels in groups.values() {
        for kernel in kernels {
            conn.execute(
                &format!(r#"INSERT INTO "{STAGE_TABLE}" ("id") VALUES (?1)"#),
                std::slice::from_ref(kernel),
            )?;
        }
    }

    let sql = format!(
        r#"SELECT b."{id}", b."{ty}", b."{payload}" FROM "{table}" AS b JOIN "{STAGE_TABLE}" AS f ON f."id" = b."{id}""#,
        id = blob.id_column,
        ty = blob.type_column,
        payload = blob.payload_column,
        table = blob.table,
    );

    let rows = conn.query(&sql, &[], &[Type::Text, Type::I32, Type::Bytes])?;

    Ok((
        rows,
        MaterializePlan::Blob(BlobPlan {
            type_name: None,
            has_type_column: true,
        }),
    ))
}
