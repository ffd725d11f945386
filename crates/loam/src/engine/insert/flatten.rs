use super::row::{InsertRow, RowId, RowKey, RowSet, RowValue};
use super::walk::CollectedGraph;
use crate::engine::EngineContext;

use loam_core::feature::{Feature, FeatureRef, Property, PropertyValue};
use loam_core::schema::mapping::JoinChain;
use loam_core::schema::{FeatureTypeMapping, Mapping, MappingExpression};
use loam_core::stmt::Value;
use loam_core::{bail, Result};

/// Flattens every collected feature into rows, walking its mapping in
/// property-declaration order.
///
/// Feature (and BLOB payload) rows for the whole graph are created before
/// any property is flattened. That registration is the in-flight map: a
/// feature-reference property always finds its target's row, even when the
/// target is flattened later or the reference is part of a cycle.
pub(crate) fn flatten(cx: &EngineContext, graph: &CollectedGraph) -> Result<RowSet> {
    let mut rows = RowSet::default();
    let schema = &cx.schema;

    let mut feature_rows: Vec<Option<RowId>> = Vec::with_capacity(graph.features.len());

    for feature in &graph.features {
        let mapping = schema.feature_type(&feature.type_name)?;
        let kernel = kernel_of(mapping, feature)?;

        let blob_row = match &schema.blob {
            Some(blob) => {
                let payload = cx.payload_codec()?.encode(feature, &cx.storage_crs)?;

                let mut row = InsertRow::new(blob.table.clone());
                row.is_feature = true;
                row.key = Some(RowKey {
                    column: blob.id_column.clone(),
                    value: kernel.clone(),
                });
                row.set(&blob.id_column, RowValue::Value(kernel.clone()));
                row.set(
                    &blob.type_column,
                    RowValue::Value(Value::I32(mapping.type_id as i32)),
                );
                row.set(&blob.payload_column, RowValue::Value(Value::Bytes(payload)));
                if let Some(envelope) = feature.envelope() {
                    row.set(&blob.bbox.min_x, RowValue::Value(Value::F64(envelope.min_x)));
                    row.set(&blob.bbox.min_y, RowValue::Value(Value::F64(envelope.min_y)));
                    row.set(&blob.bbox.max_x, RowValue::Value(Value::F64(envelope.max_x)));
                    row.set(&blob.bbox.max_y, RowValue::Value(Value::F64(envelope.max_y)));
                }
                Some(rows.push(row))
            }
            None => None,
        };

        let feature_row = match &mapping.table {
            Some(table) => {
                let mut row = InsertRow::new(table.clone());
                row.is_feature = true;
                row.key = Some(RowKey {
                    column: mapping.fid.column.clone(),
                    value: kernel.clone(),
                });
                row.set(&mapping.fid.column, RowValue::Value(kernel));
                // The payload row goes in before the feature's relational
                // rows
                row.after = blob_row;
                Some(rows.push(row))
            }
            None => blob_row,
        };

        feature_rows.push(feature_row);
    }

    for (index, feature) in graph.features.iter().enumerate() {
        let mapping = schema.feature_type(&feature.type_name)?;
        if mapping.table.is_none() {
            // Pure BLOB storage has no relational property rows
            continue;
        }
        let parent = feature_rows[index].unwrap();

        let mut flattener = Flattener {
            cx,
            graph,
            rows: &mut rows,
            feature_rows: &feature_rows,
        };

        for (name, property) in &mapping.properties {
            for value in feature.properties_named(name) {
                flattener.flatten_property(parent, name, property, value)?;
            }
        }
    }

    Ok(rows)
}

fn kernel_of(mapping: &FeatureTypeMapping, feature: &Feature) -> Result<Value> {
    let id = feature.id.as_ref().expect("ids are assigned before flattening");
    match mapping.fid.parse_id(id)? {
        Some(kernel) => Ok(kernel),
        None => bail!(
            "feature id `{id}` does not follow the `{}` id convention",
            mapping.name
        ),
    }
}

struct Flattener<'a> {
    cx: &'a EngineContext,
    graph: &'a CollectedGraph,
    rows: &'a mut RowSet,
    feature_rows: &'a [Option<RowId>],
}

impl Flattener<'_> {
    fn flatten_property(
        &mut self,
        parent: RowId,
        name: &str,
        mapping: &Mapping,
        value: &PropertyValue,
    ) -> Result<()> {
        match mapping {
            Mapping::Primitive(m) => {
                let PropertyValue::Primitive(scalar) = value else {
                    bail!("property `{name}` expects a scalar value");
                };
                self.write_column(parent, m.join.as_ref(), &m.expr, scalar.clone())
            }
            Mapping::Geometry(m) => {
                let PropertyValue::Geometry(geometry) = value else {
                    bail!("property `{name}` expects a geometry value");
                };

                let geometry = if geometry.crs != m.crs {
                    self.cx.crs_transformer.transform(geometry, &m.crs)?
                } else {
                    geometry.clone()
                };
                let encoded = self.cx.geometry_codec.encode(&geometry, &m.crs)?;

                self.write_column(parent, m.join.as_ref(), &m.expr, Value::Bytes(encoded))
            }
            Mapping::Feature(m) => {
                let PropertyValue::Feature(reference) = value else {
                    bail!("property `{name}` expects a feature reference");
                };
                let link = self.resolve_reference(name, &m.target, reference)?;

                match &m.join {
                    Some(chain) if chain.is_join_table() => {
                        // A new join-table row linking both sides
                        let mut row = InsertRow::new(chain.steps()[0].table.clone());
                        row.set(
                            &chain.steps()[0].target_column,
                            RowValue::Link(parent),
                        );
                        row.set(&chain.steps()[1].source_column, link);
                        self.apply_generated_key(&mut row, chain);
                        self.rows.push(row);
                        Ok(())
                    }
                    Some(chain) => {
                        let key = m.key.as_ref().and_then(|k| k.as_column());
                        let Some(key) = key else {
                            bail!("property `{name}` has no writable key column");
                        };
                        let mut row = self.chained_row(parent, chain);
                        row.set(&key.column, link);
                        self.rows.push(row);
                        Ok(())
                    }
                    None => {
                        let key = m.key.as_ref().and_then(|k| k.as_column());
                        let Some(key) = key else {
                            bail!("property `{name}` has no writable key column");
                        };
                        let column = key.column.clone();
                        self.rows.get_mut(parent).set(&column, link);
                        Ok(())
                    }
                }
            }
            Mapping::Compound(m) => {
                let PropertyValue::Complex(children) = value else {
                    bail!("property `{name}` expects a structured value");
                };

                let target = match &m.join {
                    Some(chain) => {
                        let row = self.chained_row(parent, chain);
                        self.rows.push(row)
                    }
                    None => parent,
                };

                for (child_name, child_mapping) in &m.children {
                    for child in properties_named(children, child_name) {
                        self.flatten_property(target, child_name, child_mapping, child)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Writes a scalar column either onto the parent row or, following a
    /// join chain, onto a new related-table row. Computed mapping
    /// expressions are read-only and skipped.
    fn write_column(
        &mut self,
        parent: RowId,
        join: Option<&JoinChain>,
        expr: &MappingExpression,
        value: Value,
    ) -> Result<()> {
        let Some(column) = expr.as_column() else {
            return Ok(());
        };
        if column.table.is_some() {
            return Ok(());
        }

        match join {
            None => {
                let name = column.column.clone();
                self.rows.get_mut(parent).set(&name, RowValue::Value(value));
            }
            Some(chain) => {
                let mut row = self.chained_row(parent, chain);
                row.set(&column.column, RowValue::Value(value));
                self.rows.push(row);
            }
        }
        Ok(())
    }

    /// A new row in the chain's first table, linked back to the parent row.
    fn chained_row(&mut self, parent: RowId, chain: &JoinChain) -> InsertRow {
        let step = &chain.steps()[0];
        let mut row = InsertRow::new(step.table.clone());
        row.set(&step.target_column, RowValue::Link(parent));
        self.apply_generated_key(&mut row, chain);
        row
    }

    fn apply_generated_key(&mut self, row: &mut InsertRow, chain: &JoinChain) {
        if let Some(column) = &chain.generated_key {
            let key = Value::String(uuid::Uuid::new_v4().simple().to_string());
            row.key = Some(RowKey {
                column: column.clone(),
                value: key.clone(),
            });
            row.set(column, RowValue::Value(key));
        }
    }

    /// Resolves a feature reference to either a link on an in-document row
    /// or, for references to features not part of this insert, the
    /// referenced row's key value.
    fn resolve_reference(
        &self,
        name: &str,
        target: &str,
        reference: &FeatureRef,
    ) -> Result<RowValue> {
        if let Some(index) = self.graph.index_of(reference) {
            let actual = &self.graph.features[index].type_name;
            if actual != target {
                bail!(
                    "property `{name}` links to a `{actual}` feature, but its \
                     foreign key targets `{target}`"
                );
            }
            let Some(row) = self.feature_rows[index] else {
                bail!("property `{name}` links to a feature without a key row");
            };
            return Ok(RowValue::Link(row));
        }

        // A reference to a feature that already exists in the store
        let id = match reference.id() {
            Some(id) => id.clone(),
            None => bail!("property `{name}` references a feature without an id"),
        };
        let mapping = self.cx.schema.feature_type(target)?;
        match mapping.fid.parse_id(&id)? {
            Some(kernel) => Ok(RowValue::Value(kernel)),
            None => bail!(
                "property `{name}` references `{id}`, which does not follow the \
                 `{target}` id convention"
            ),
        }
    }
}

fn properties_named<'a>(
    properties: &'a [Property],
    name: &'a str,
) -> impl Iterator<Item = &'a PropertyValue> + 'a {
    properties
        .iter()
        .filter(move |p| p.name == name)
        .map(|p| &p.value)
}
