use super::EngineContext;

use loam_core::driver::Connection;
use loam_core::feature::Envelope;
use loam_core::schema::{FeatureTypeMapping, Mapping};
use loam_core::stmt::{Type, Value};
use loam_core::Result;
use loam_sql::stmt as sql;

/// The aggregate bounding box of one feature type.
///
/// BLOB-backed storage aggregates the indexed bounding-box columns in a
/// single statement. Pure relational storage scans the type's geometry
/// columns and merges codec-decoded envelopes; relational mode is reserved
/// for narrow types, so the scan is acceptable.
pub(crate) fn execute(
    cx: &EngineContext,
    conn: &mut dyn Connection,
    type_name: &str,
) -> Result<Option<Envelope>> {
    let mapping = cx.schema.feature_type(type_name)?;

    if let Some(blob) = &cx.schema.blob {
        let mut select = sql::Select::new(sql::TableWithJoins::aliased(blob.table.clone(), "a0"));
        let min = |name: &str| {
            sql::Expr::func("MIN", vec![sql::Expr::column(Some("a0"), name)])
        };
        let max = |name: &str| {
            sql::Expr::func("MAX", vec![sql::Expr::column(Some("a0"), name)])
        };
        select.columns = vec![
            min(&blob.bbox.min_x),
            min(&blob.bbox.min_y),
            max(&blob.bbox.max_x),
            max(&blob.bbox.max_y),
        ];
        select.filter = Some(sql::Expr::eq(
            sql::Expr::column(Some("a0"), &blob.type_column),
            sql::Expr::value(mapping.type_id as i32),
        ));

        let mut params: Vec<Value> = vec![];
        let statement = cx
            .serializer()
            .serialize(&loam_sql::Statement::Select(select), &mut params);
        let mut rows = conn.query(&statement, &params, &[Type::F64; 4])?;

        let Some(row) = rows.next() else {
            return Ok(None);
        };
        let bound = |value: &Value| value.as_f64();
        return Ok(
            match (
                bound(row.get(0)),
                bound(row.get(1)),
                bound(row.get(2)),
                bound(row.get(3)),
            ) {
                (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => {
                    Some(Envelope::new(min_x, min_y, max_x, max_y))
                }
                _ => None,
            },
        );
    }

    let mut sites = vec![];
    collect_geometry_sites(mapping, &mut sites);

    let mut ret: Option<Envelope> = None;
    for (table, column) in sites {
        let mut select = sql::Select::new(sql::TableWithJoins::aliased(table, "a0"));
        select.columns = vec![sql::Expr::column(Some("a0"), column)];

        let mut params: Vec<Value> = vec![];
        let statement = cx
            .serializer()
            .serialize(&loam_sql::Statement::Select(select), &mut params);

        for mut row in conn.query(&statement, &params, &[Type::Bytes])? {
            let value = row.take(0);
            if value.is_null() {
                continue;
            }
            let geometry = cx.geometry_codec.decode(&value.to_bytes()?)?;
            if let Some(envelope) = geometry.envelope {
                ret = Some(match ret {
                    Some(acc) => acc.union(&envelope),
                    None => envelope,
                });
            }
        }
    }

    Ok(ret)
}

/// Every geometry column of the type: `(table, column)`, following join
/// chains to the table the column actually lives in.
fn collect_geometry_sites<'a>(
    mapping: &'a FeatureTypeMapping,
    out: &mut Vec<(String, &'a str)>,
) {
    fn visit<'a>(own_table: &str, mapping: &'a Mapping, out: &mut Vec<(String, &'a str)>) {
        let table = match mapping.join() {
            Some(chain) => chain.steps()[0].table.clone(),
            None => own_table.to_string(),
        };

        match mapping {
            Mapping::Geometry(m) => {
                if let Some(column) = m.expr.as_column() {
                    if column.table.is_none() {
                        out.push((table, &column.column));
                    }
                }
            }
            Mapping::Compound(m) => {
                for child in m.children.values() {
                    visit(&table, child, out);
                }
            }
            Mapping::Primitive(_) | Mapping::Feature(_) => {}
        }
    }

    let Some(own_table) = &mapping.table else {
        return;
    };
    for property in mapping.properties.values() {
        visit(own_table, property, out);
    }
}
