use super::materialize::Materializer;
use super::translate;
use super::EngineContext;
use crate::query::Query;

use loam_core::driver::Connection;
use loam_core::schema::{FeatureTypeMapping, Mapping};
use loam_core::schema::mapping::JoinChain;
use loam_core::stmt::Value;
use loam_core::Result;
use loam_sql::stmt as sql;

/// Deletes the features matching the filter, together with their
/// related-table rows and BLOB payload rows. Returns the number of deleted
/// features.
///
/// The filter goes through the same translation path as a query; matching
/// ids are collected first (applying any residual filter in memory), then
/// rows are removed related-tables-first so no link outlives its target.
pub(crate) fn execute(
    cx: &EngineContext,
    conn: &mut dyn Connection,
    query: &Query,
) -> Result<u64> {
    let translated = translate::translate_query(&cx.schema, query, cx.dialect)?;
    let residual = translated.residual.filter.clone();
    let (statement, params) = translated.serialize(cx.dialect);

    let rows = conn.query(&statement, &params, &translated.tys)?;

    let materializer =
        (!residual.is_empty()).then(|| Materializer::new(cx.clone(), translated.plan));

    let mut kernels: Vec<Value> = vec![];
    for row in rows {
        let kernel = row.get(0).clone();

        if let Some(materializer) = &materializer {
            let feature = materializer.build_feature(conn, row)?;
            let mut matches = true;
            for conjunct in &residual {
                if !conjunct.eval(&feature)? {
                    matches = false;
                    break;
                }
            }
            if !matches {
                continue;
            }
        }

        kernels.push(kernel);
    }

    if kernels.is_empty() {
        return Ok(0);
    }

    let mapping = cx.schema.feature_type(&query.type_name)?;
    let serializer = cx.serializer();

    let mut chains = vec![];
    collect_chains(mapping, &mut chains);

    for chain in chains {
        let step = &chain.steps()[0];
        delete_where(conn, &serializer, &step.table, &step.target_column, &kernels)?;
    }

    if let Some(table) = &mapping.table {
        delete_where(conn, &serializer, table, &mapping.fid.column, &kernels)?;
    }

    if let Some(blob) = &cx.schema.blob {
        delete_where(conn, &serializer, &blob.table, &blob.id_column, &kernels)?;
    }

    Ok(kernels.len() as u64)
}

fn delete_where(
    conn: &mut dyn Connection,
    serializer: &loam_sql::Serializer,
    table: &str,
    column: &str,
    kernels: &[Value],
) -> Result<()> {
    for kernel in kernels {
        let mut delete = sql::Delete::new(table);
        delete.filter = Some(sql::Expr::eq(
            sql::Expr::column(None, column),
            sql::Expr::Value(kernel.clone()),
        ));

        let mut params: Vec<Value> = vec![];
        let statement = serializer.serialize(&loam_sql::Statement::Delete(delete), &mut params);
        tracing::debug!(sql = %statement, "delete row");
        conn.execute(&statement, &params)?;
    }
    Ok(())
}

fn collect_chains<'a>(mapping: &'a FeatureTypeMapping, out: &mut Vec<&'a JoinChain>) {
    fn visit<'a>(mapping: &'a Mapping, out: &mut Vec<&'a JoinChain>) {
        if let Some(chain) = mapping.join() {
            out.push(chain);
        }
        if let Mapping::Compound(compound) = mapping {
            for child in compound.children.values() {
                visit(child, out);
            }
        }
    }

    for property in mapping.properties.values() {
        visit(property, out);
    }
}
