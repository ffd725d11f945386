use super::mapping::{
    CompoundMapping, FeatureMapping, FeatureTypeMapping, FidMapping, GeometryKind,
    GeometryMapping, JoinChain, JoinStep, Mapping, MappingExpression, PrimitiveMapping,
};
use super::{app, db, BlobMapping, Schema, StorageMode};
use crate::feature::Crs;
use crate::stmt::Type;
use crate::{Error, Result};

use indexmap::IndexMap;

/// Builds a [`Schema`] from declarative feature-type descriptions.
///
/// Building is all-or-nothing: any configuration error (unknown type token,
/// malformed mapping expression, unsupported join-chain length) aborts the
/// build. Building twice from the same declarations yields structurally
/// identical mappings and identical derived table/column names.
#[derive(Debug)]
pub struct Builder {
    /// If set, prefix all table names with this string
    table_name_prefix: Option<String>,

    /// Longest identifier the backing database accepts; longer derived
    /// names are replaced with a short synthetic id.
    max_identifier_length: usize,
}

/// Used to track state during the build process
struct BuildSchema<'a> {
    builder: &'a Builder,

    /// Feature type mappings as they are built. Stubs (fid, table,
    /// discriminator) are reserved for all types before any property
    /// mapping is compiled, so feature references can look up their target.
    types: IndexMap<String, FeatureTypeMapping>,

    /// Tables as they are derived
    tables: IndexMap<String, db::Table>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            table_name_prefix: None,
            max_identifier_length: 64,
        }
    }

    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.table_name_prefix = Some(prefix.to_string());
        self
    }

    pub fn max_identifier_length(&mut self, length: usize) -> &mut Self {
        self.max_identifier_length = length;
        self
    }

    pub fn build(&self, app: app::Schema) -> Result<Schema> {
        let relational = app
            .feature_types
            .iter()
            .any(|ft| !ft.properties.is_empty());

        let mode = match (app.blob.is_some(), relational) {
            (true, true) => StorageMode::Hybrid,
            (true, false) => StorageMode::Blob,
            (false, true) => StorageMode::Relational,
            (false, false) => {
                return Err(Error::invalid_schema(
                    "configuration declares neither BLOB storage nor property mappings",
                ))
            }
        };

        let blob = app
            .blob
            .as_ref()
            .map(|decl| BlobMapping::with_defaults(decl.table.clone()));

        let mut cx = BuildSchema {
            builder: self,
            types: IndexMap::new(),
            tables: IndexMap::new(),
        };

        // Reserve fid conventions, table names, and discriminators for every
        // type before compiling any property mapping. Discriminator values
        // are sequential in declaration order, which keeps them stable
        // across schema reloads that only append new types.
        for (index, decl) in app.feature_types.iter().enumerate() {
            let type_id = u16::try_from(index + 1)
                .map_err(|_| Error::invalid_schema("too many feature types"))?;
            cx.reserve_feature_type(decl, type_id, mode)?;
        }

        for decl in &app.feature_types {
            let properties = cx.build_properties(decl)?;
            cx.types[&decl.name].properties = properties;
        }

        cx.build_tables(blob.as_ref());

        let schema = Schema {
            types: cx.types,
            blob,
            mode,
            db: db::Schema {
                tables: cx.tables.into_values().collect(),
            },
        };

        schema.verify()?;

        Ok(schema)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildSchema<'_> {
    fn reserve_feature_type(
        &mut self,
        decl: &app::FeatureType,
        type_id: u16,
        mode: StorageMode,
    ) -> Result<()> {
        if self.types.contains_key(&decl.name) {
            return Err(Error::invalid_schema(format!(
                "duplicate feature type `{}`",
                decl.name
            )));
        }

        let fid = self.fid_mapping(decl, mode)?;

        let table = if mode.is_relational() {
            Some(self.table_name(decl))
        } else {
            None
        };

        self.types.insert(
            decl.name.clone(),
            FeatureTypeMapping {
                name: decl.name.clone(),
                type_id,
                is_abstract: decl.is_abstract,
                table,
                fid,
                properties: IndexMap::new(),
            },
        );

        Ok(())
    }

    fn fid_mapping(&self, decl: &app::FeatureType, mode: StorageMode) -> Result<FidMapping> {
        let Some(fid) = &decl.fid else {
            return Ok(FidMapping {
                column: "fid".to_string(),
                ty: Type::Text,
                prefix: Some(format!("{}_", decl.name.to_uppercase())),
                suffix: None,
            });
        };

        let mut ty = Type::from_token(fid.ty.as_deref().unwrap_or("string"))?;
        if mode.is_blob_backed() {
            // The BLOB table's id column is textual, and hybrid statements
            // join it directly against the feature table's fid column, so
            // id-kernels store as text whenever the BLOB table exists.
            ty = Type::Text;
        }

        Ok(FidMapping {
            column: fid.column.clone().unwrap_or_else(|| "fid".to_string()),
            ty,
            prefix: fid.prefix.clone(),
            suffix: fid.suffix.clone(),
        })
    }

    fn table_name(&self, decl: &app::FeatureType) -> String {
        let base = match &decl.table {
            Some(table) => table.clone(),
            None => self.derive_identifier(&[&decl.name]),
        };

        match &self.builder.table_name_prefix {
            Some(prefix) => format!("{prefix}{base}"),
            None => base,
        }
    }

    fn build_properties(&self, decl: &app::FeatureType) -> Result<IndexMap<String, Mapping>> {
        let mut properties = IndexMap::new();

        for property in &decl.properties {
            if properties.contains_key(&property.name) {
                return Err(Error::invalid_schema(format!(
                    "duplicate property `{}` on feature type `{}`",
                    property.name, decl.name
                )));
            }

            let mapping = self.build_mapping(&[], property)?;
            properties.insert(property.name.clone(), mapping);
        }

        Ok(properties)
    }

    fn build_mapping(&self, parent_path: &[&str], property: &app::Property) -> Result<Mapping> {
        let mut path: Vec<&str> = parent_path.to_vec();
        path.push(&property.name);

        Ok(match &property.kind {
            app::PropertyKind::Primitive { expr, ty, join } => Mapping::Primitive(PrimitiveMapping {
                expr: self.expression(expr.as_deref(), &path)?,
                ty: Type::from_token(ty)?,
                join: self.join_chain(join.as_ref())?,
            }),
            app::PropertyKind::Geometry {
                expr,
                kind,
                dim,
                crs,
                join,
            } => {
                if !(2..=3).contains(dim) {
                    return Err(Error::invalid_schema(format!(
                        "geometry property `{}` has unsupported dimensionality {dim}",
                        property.name
                    )));
                }

                Mapping::Geometry(GeometryMapping {
                    expr: self.expression(expr.as_deref(), &path)?,
                    kind: GeometryKind::from_token(kind)?,
                    dim: *dim,
                    crs: Crs::new(crs.clone()),
                    join: self.join_chain(join.as_ref())?,
                })
            }
            app::PropertyKind::Feature { target, key, join } => {
                if !self.types.contains_key(target) {
                    return Err(Error::invalid_schema(format!(
                        "feature property `{}` references undeclared type `{target}`",
                        property.name
                    )));
                }

                let join = self.join_chain(join.as_ref())?;
                let key = match &join {
                    Some(chain) if chain.is_join_table() => {
                        if key.is_some() {
                            return Err(Error::invalid_schema(format!(
                                "feature property `{}` declares both a key column and a join table",
                                property.name
                            )));
                        }
                        None
                    }
                    _ => Some(self.expression(key.as_deref(), &path)?),
                };

                Mapping::Feature(FeatureMapping {
                    target: target.clone(),
                    key,
                    join,
                })
            }
            app::PropertyKind::Compound { children, join } => {
                let mut mapped = IndexMap::new();
                for child in children {
                    if mapped.contains_key(&child.name) {
                        return Err(Error::invalid_schema(format!(
                            "duplicate property `{}` under `{}`",
                            child.name,
                            path.join(".")
                        )));
                    }
                    mapped.insert(child.name.clone(), self.build_mapping(&path, child)?);
                }

                Mapping::Compound(CompoundMapping {
                    children: mapped,
                    join: self.join_chain(join.as_ref())?,
                })
            }
        })
    }

    fn expression(&self, expr: Option<&str>, path: &[&str]) -> Result<MappingExpression> {
        match expr {
            Some(expr) => MappingExpression::parse(expr),
            None => Ok(MappingExpression::column(self.derive_identifier(path))),
        }
    }

    fn join_chain(&self, decl: Option<&app::JoinDecl>) -> Result<Option<JoinChain>> {
        let Some(decl) = decl else {
            return Ok(None);
        };

        let steps = decl
            .steps
            .iter()
            .map(|step| JoinStep {
                table: step.table.clone(),
                source_column: step.source_column.clone(),
                target_column: step.target_column.clone(),
            })
            .collect();

        JoinChain::new(steps, decl.generated_key.clone()).map(Some)
    }

    /// Derives a column/table identifier from path segments: segments joined
    /// with `_`, lower-cased. When the derived identifier exceeds the
    /// database's identifier-length limit it is replaced with a short
    /// synthetic id, stable across repeated builder runs for the same input.
    fn derive_identifier(&self, segments: &[&str]) -> String {
        let derived = segments.join("_").to_lowercase();
        if derived.len() <= self.builder.max_identifier_length {
            return derived;
        }

        format!("p_{:08x}", fnv1a(&derived) as u32)
    }

    fn build_tables(&mut self, blob: Option<&BlobMapping>) {
        if let Some(blob) = blob {
            let mut table = db::Table::new(blob.table.clone());
            table.push_column(db::Column::new(&blob.id_column, Type::Text).not_null());
            table.primary_key = Some(0);
            table.push_column(db::Column::new(&blob.type_column, Type::I32).not_null());
            table.push_column(db::Column::new(&blob.payload_column, Type::Bytes));
            for bbox in [
                &blob.bbox.min_x,
                &blob.bbox.min_y,
                &blob.bbox.max_x,
                &blob.bbox.max_y,
            ] {
                table.push_column(db::Column::new(bbox, Type::F64));
            }
            self.tables.insert(table.name.clone(), table);
        }

        let types: Vec<FeatureTypeMapping> = self.types.values().cloned().collect();

        for mapping in &types {
            let Some(table_name) = &mapping.table else {
                continue;
            };

            let table = self
                .tables
                .entry(table_name.clone())
                .or_insert_with(|| db::Table::new(table_name.clone()));
            table.push_column(db::Column::new(&mapping.fid.column, mapping.fid.ty).not_null());
            table.primary_key = Some(0);

            for property in mapping.properties.values() {
                self.push_mapping_columns(table_name, &mapping.fid, property);
            }
        }
    }

    fn push_mapping_columns(&mut self, own_table: &str, fid: &FidMapping, mapping: &Mapping) {
        let fk_ty = self.fid_type_of(mapping);

        // Columns land either on the feature's own table or, following the
        // join chain, on the related table. For a two-step chain the final
        // table is the target feature's own table; only the join table is
        // derived here.
        let (table_name, mut columns) = match mapping.join() {
            None => (own_table.to_string(), vec![]),
            Some(chain) => {
                let first = &chain.steps()[0];
                let mut links =
                    vec![db::Column::new(&first.target_column, fid.ty).not_null()];
                if let Some(generated) = &chain.generated_key {
                    links.push(db::Column::new(generated, Type::Text).not_null());
                }
                if chain.is_join_table() {
                    let second = &chain.steps()[1];
                    links.push(db::Column::new(&second.source_column, fk_ty).not_null());
                }
                (first.table.clone(), links)
            }
        };

        match mapping {
            Mapping::Primitive(m) => {
                if let Some(column) = m.expr.as_column() {
                    if column.table.is_none() {
                        columns.push(db::Column::new(&column.column, m.ty));
                    }
                }
            }
            Mapping::Geometry(m) => {
                if let Some(column) = m.expr.as_column() {
                    if column.table.is_none() {
                        columns.push(db::Column::new(&column.column, Type::Bytes));
                    }
                }
            }
            Mapping::Feature(m) => {
                if let Some(column) = m.key.as_ref().and_then(|k| k.as_column()) {
                    if column.table.is_none() {
                        columns.push(db::Column::new(&column.column, fk_ty));
                    }
                }
            }
            Mapping::Compound(_) => {}
        }

        let table = self
            .tables
            .entry(table_name.clone())
            .or_insert_with(|| db::Table::new(table_name.clone()));
        for column in columns {
            table.push_column(column);
        }

        if let Mapping::Compound(m) = mapping {
            let children: Vec<Mapping> = m.children.values().cloned().collect();
            for child in &children {
                self.push_mapping_columns(&table_name, fid, child);
            }
        }
    }

    /// The fid type of a feature mapping's target type.
    fn fid_type_of(&self, mapping: &Mapping) -> Type {
        match mapping {
            Mapping::Feature(m) => self
                .types
                .get(&m.target)
                .map(|t| t.fid.ty)
                .unwrap_or(Type::Text),
            _ => Type::Text,
        }
    }
}

fn fnv1a(input: &str) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    for byte in input.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
