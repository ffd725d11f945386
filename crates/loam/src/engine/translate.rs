//! Lowers (feature type, filter tree, sort, paging) to one parametrized SQL
//! statement plus a residual.
//!
//! Fragments the mapping model cannot reach are not errors: they split off
//! into a residual filter/sort applied in memory after fetch, over a
//! superset of the matching rows. Conjuncts are lowered independently, so
//! dropping one from the statement can only widen the fetch, never narrow
//! it.

use super::materialize::{BlobPlan, JoinedPlan, MaterializePlan, RelationalPlan, ValuePlan};
use crate::query::Query;

use loam_core::driver::SqlDialect;
use loam_core::feature::{Envelope, FeatureId};
use loam_core::schema::mapping::JoinChain;
use loam_core::schema::{
    BlobMapping, FeatureTypeMapping, Mapping, MappingExpression, StorageMode,
};
use loam_core::stmt::{BinaryOp, Expr, OrderBy, Page, Path, Type, Value};
use loam_core::{Error, Result, Schema};
use loam_sql::stmt as sql;

/// `Err(())` marks a fragment the mapping model cannot reach; it moves to
/// the residual instead of failing the query.
type LowerResult<T> = std::result::Result<T, ()>;

/// The translated statement and everything needed to consume its rows.
#[derive(Debug)]
pub(crate) struct TranslatedQuery {
    pub select: sql::Select,
    pub tys: Vec<Type>,
    pub plan: MaterializePlan,
    pub residual: Residual,
}

/// Filter/sort/paging fragments evaluated in memory after fetch.
#[derive(Debug, Default)]
pub(crate) struct Residual {
    /// Conjuncts that must all hold.
    pub filter: Vec<Expr>,

    pub order_by: OrderBy,

    /// Paging withheld from the statement because a residual filter or sort
    /// must apply first.
    pub page: Option<Page>,
}

impl Residual {
    pub(crate) fn is_empty(&self) -> bool {
        self.filter.is_empty() && self.order_by.is_empty() && self.page.is_none()
    }

    /// Sorting needs the full result set in hand before anything can be
    /// yielded.
    pub(crate) fn needs_collect(&self) -> bool {
        !self.order_by.is_empty()
    }
}

impl TranslatedQuery {
    pub(crate) fn serialize(&self, dialect: SqlDialect) -> (String, Vec<Value>) {
        let mut params: Vec<Value> = vec![];
        let sql = super::serializer(dialect)
            .serialize(&loam_sql::Statement::Select(self.select.clone()), &mut params);
        (sql, params)
    }
}

pub(crate) fn translate_query(
    schema: &Schema,
    query: &Query,
    dialect: SqlDialect,
) -> Result<TranslatedQuery> {
    let mapping = schema.feature_type(&query.type_name)?;

    match schema.mode {
        StorageMode::Relational => relational_query(schema, mapping, query, dialect),
        StorageMode::Blob | StorageMode::Hybrid => blob_query(schema, mapping, query, dialect),
    }
}

/// The `COUNT(*)` fast path. `None` when a residual (or a row-multiplying
/// join) forces counting materialized features instead.
pub(crate) fn translate_count(
    schema: &Schema,
    query: &Query,
    dialect: SqlDialect,
) -> Result<Option<(String, Vec<Value>)>> {
    let mut translated = translate_query(schema, query, dialect)?;

    if !translated.residual.is_empty() || !translated.select.from.joins.is_empty() {
        return Ok(None);
    }

    translated.select.columns = vec![sql::Expr::count_star()];
    translated.select.order_by.clear();
    translated.select.limit = None;
    translated.select.offset = None;
    translated.tys = vec![Type::I64];

    Ok(Some(translated.serialize(dialect)))
}

/// The column plan and select skeleton shared by general queries and
/// id-set queries in relational storage: fid first, then one
/// column/expression per mapped property, in mapping-declaration order.
pub(crate) struct RelationalBase {
    pub select: sql::Select,
    pub tys: Vec<Type>,
    pub plan: RelationalPlan,
    pub root: String,
    aliases: Aliases,
}

pub(crate) fn relational_base(
    schema: &Schema,
    mapping: &FeatureTypeMapping,
    dialect: SqlDialect,
) -> Result<RelationalBase> {
    let table = mapping.table.as_ref().ok_or_else(|| {
        Error::invalid_schema(format!(
            "feature type `{}` has no relational table",
            mapping.name
        ))
    })?;

    let mut aliases = Aliases::default();
    let root = aliases.alloc();

    let mut select = sql::Select::new(sql::TableWithJoins::aliased(table.clone(), root.clone()));

    let mut planner = PropertyPlanner::new(schema, root.clone(), dialect);
    planner.push_expr(
        &MappingExpression::column(mapping.fid.column.clone()),
        mapping.fid.ty,
    );
    let mut properties = vec![];
    for (name, property) in &mapping.properties {
        let plan = planner.plan_mapping(name, property)?;
        properties.push((name.clone(), plan));
    }

    select.columns = planner.columns;

    Ok(RelationalBase {
        select,
        tys: planner.tys,
        plan: RelationalPlan {
            type_name: mapping.name.clone(),
            properties,
            joined: planner.joined,
        },
        root,
        aliases,
    })
}

fn relational_query(
    schema: &Schema,
    mapping: &FeatureTypeMapping,
    query: &Query,
    dialect: SqlDialect,
) -> Result<TranslatedQuery> {
    let mut base = relational_base(schema, mapping, dialect)?;
    let mut select = base.select;

    let mut lowerer = Lowerer {
        schema,
        aliases: &mut base.aliases,
        relational: Some((mapping, base.root)),
        blob: None,
        joins: vec![],
    };

    let residual = apply_filter_and_sort(&mut select, &mut lowerer, query);
    select.from.joins = lowerer.joins;
    if !select.from.joins.is_empty() {
        select.distinct = true;
    }

    Ok(TranslatedQuery {
        select,
        tys: base.tys,
        plan: MaterializePlan::Relational(base.plan),
        residual,
    })
}

fn blob_query(
    schema: &Schema,
    mapping: &FeatureTypeMapping,
    query: &Query,
    dialect: SqlDialect,
) -> Result<TranslatedQuery> {
    let blob = schema
        .blob
        .as_ref()
        .ok_or_else(|| Error::invalid_schema("BLOB storage without a BLOB table descriptor"))?;

    let mut aliases = Aliases::default();
    let blob_alias = aliases.alloc();

    let mut select = sql::Select::new(sql::TableWithJoins::aliased(
        blob.table.clone(),
        blob_alias.clone(),
    ));
    select.columns = vec![
        sql::Expr::column(Some(&blob_alias), &blob.id_column),
        sql::Expr::column(Some(&blob_alias), &blob.payload_column),
    ];
    let tys = vec![Type::Text, Type::Bytes];

    // The relational side joins in for hybrid configurations, carrying the
    // per-property predicates; the discriminator and bounding-box prefilter
    // stay on the indexed BLOB side.
    let mut relational = None;
    if schema.mode == StorageMode::Hybrid {
        if let Some(table) = &mapping.table {
            let rel_alias = aliases.alloc();
            select.from.joins.push(sql::Join {
                table: table.clone(),
                alias: rel_alias.clone(),
                on: sql::Expr::eq(
                    sql::Expr::column(Some(&rel_alias), &mapping.fid.column),
                    sql::Expr::column(Some(&blob_alias), &blob.id_column),
                ),
            });
            relational = Some((mapping, rel_alias));
        }
    }

    let mut lowerer = Lowerer {
        schema,
        aliases: &mut aliases,
        relational,
        blob: Some((blob, blob_alias.clone())),
        joins: vec![],
    };

    let mut residual = apply_filter_and_sort(&mut select, &mut lowerer, query);
    let chain_joins = lowerer.joins;

    let discriminator = sql::Expr::eq(
        sql::Expr::column(Some(&blob_alias), &blob.type_column),
        sql::Expr::value(mapping.type_id as i32),
    );
    select.filter = Some(match select.filter.take() {
        Some(filter) => sql::Expr::And(vec![discriminator, filter]),
        None => discriminator,
    });

    select.from.joins.extend(chain_joins);
    if !select.from.joins.is_empty() {
        select.distinct = true;
        // DISTINCT cannot compare payload blobs portably, so paging moves in
        // memory when joins multiplied rows and a page was requested
        if residual.page.is_none() && !query.page.is_unbounded() {
            residual.page = Some(query.page);
            select.limit = None;
            select.offset = None;
        }
    }

    Ok(TranslatedQuery {
        select,
        tys,
        plan: MaterializePlan::Blob(BlobPlan {
            type_name: Some(mapping.name.clone()),
            has_type_column: false,
        }),
        residual,
    })
}

/// Lowers the filter conjuncts, sort, and paging into the statement,
/// returning what could not be pushed down.
fn apply_filter_and_sort(
    select: &mut sql::Select,
    lowerer: &mut Lowerer<'_>,
    query: &Query,
) -> Residual {
    let mut residual = Residual::default();

    let mut where_parts = vec![];
    for conjunct in conjuncts(query.filter.as_ref(), query.bbox.as_ref()) {
        match lowerer.lower(&conjunct) {
            Ok(expr) => where_parts.push(expr),
            Err(()) => residual.filter.push(conjunct),
        }
    }
    if !where_parts.is_empty() {
        select.filter = Some(if where_parts.len() == 1 {
            where_parts.pop().unwrap()
        } else {
            sql::Expr::And(where_parts)
        });
    }

    if !query.order_by.is_empty() {
        match lowerer.lower_order(&query.order_by) {
            Some(order_by) => select.order_by = order_by,
            None => residual.order_by = query.order_by.clone(),
        }
    }

    if residual.filter.is_empty() && residual.order_by.is_empty() {
        select.limit = query.page.limit;
        if query.page.offset > 0 {
            select.offset = Some(query.page.offset);
        }
    } else if !query.page.is_unbounded() {
        residual.page = Some(query.page);
    }

    residual
}

/// Splits a filter into its top-level conjuncts, folding the bounding-box
/// prefilter in as one more conjunct.
fn conjuncts(filter: Option<&Expr>, bbox: Option<&Envelope>) -> Vec<Expr> {
    fn flatten(expr: &Expr, out: &mut Vec<Expr>) {
        if let Expr::And(and) = expr {
            for operand in &and.operands {
                flatten(operand, out);
            }
        } else {
            out.push(expr.clone());
        }
    }

    let mut out = vec![];
    if let Some(filter) = filter {
        flatten(filter, &mut out);
    }
    if let Some(envelope) = bbox {
        out.push(Expr::bbox(*envelope));
    }
    out
}

/// Allocates table aliases, collision-free within one statement.
#[derive(Default)]
struct Aliases {
    next: usize,
}

impl Aliases {
    fn alloc(&mut self) -> String {
        let alias = format!("a{}", self.next);
        self.next += 1;
        alias
    }
}

/// Plans the main select's property columns and the follow-up queries for
/// join-chained properties.
struct PropertyPlanner<'a> {
    schema: &'a Schema,
    root: String,
    dialect: SqlDialect,
    columns: Vec<sql::Expr>,
    tys: Vec<Type>,
    joined: Vec<JoinedPlan>,
}

impl<'a> PropertyPlanner<'a> {
    fn new(schema: &'a Schema, root: String, dialect: SqlDialect) -> PropertyPlanner<'a> {
        PropertyPlanner {
            schema,
            root,
            dialect,
            columns: vec![],
            tys: vec![],
            joined: vec![],
        }
    }

    fn plan_mapping(&mut self, name: &str, mapping: &Mapping) -> Result<ValuePlan> {
        if let Some(chain) = mapping.join() {
            let plan = self.joined_plan(name, mapping, chain)?;
            self.joined.push(plan);
            return Ok(ValuePlan::Joined {
                index: self.joined.len() - 1,
            });
        }

        Ok(match mapping {
            Mapping::Primitive(m) => ValuePlan::Primitive {
                index: self.push_expr(&m.expr, m.ty),
            },
            Mapping::Geometry(m) => ValuePlan::Geometry {
                index: self.push_expr(&m.expr, Type::Bytes),
                crs: m.crs.clone(),
            },
            Mapping::Feature(m) => {
                let key = m.key.as_ref().ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "feature property `{name}` has neither a key column nor a join table"
                    ))
                })?;
                let ty = self.target_fid_ty(&m.target);
                ValuePlan::FeatureKey {
                    index: self.push_expr(key, ty),
                    target: m.target.clone(),
                }
            }
            Mapping::Compound(m) => {
                let mut children = vec![];
                for (child_name, child) in &m.children {
                    children.push((child_name.clone(), self.plan_mapping(child_name, child)?));
                }
                ValuePlan::Complex { children }
            }
        })
    }

    fn push_expr(&mut self, expr: &MappingExpression, ty: Type) -> usize {
        self.columns.push(lower_mapping_expr(Some(&self.root), expr));
        self.tys.push(ty);
        self.columns.len() - 1
    }

    fn target_fid_ty(&self, target: &str) -> Type {
        self.schema
            .types
            .get(target)
            .map(|t| t.fid.ty)
            .unwrap_or(Type::Text)
    }

    /// Builds the follow-up select for one join-chained property. The last
    /// parameter slot is the primary row's key, bound per feature at fetch
    /// time.
    fn joined_plan(
        &self,
        name: &str,
        mapping: &Mapping,
        chain: &JoinChain,
    ) -> Result<JoinedPlan> {
        let step = &chain.steps()[0];
        let alias = "j0";

        let mut select =
            sql::Select::new(sql::TableWithJoins::aliased(step.table.clone(), alias));
        let mut tys = vec![];

        let shape = match mapping {
            Mapping::Primitive(m) => {
                select.columns.push(lower_mapping_expr(Some(alias), &m.expr));
                tys.push(m.ty);
                ValuePlan::Primitive { index: 0 }
            }
            Mapping::Geometry(m) => {
                select.columns.push(lower_mapping_expr(Some(alias), &m.expr));
                tys.push(Type::Bytes);
                ValuePlan::Geometry {
                    index: 0,
                    crs: m.crs.clone(),
                }
            }
            Mapping::Feature(m) => {
                let column = if chain.is_join_table() {
                    chain.steps()[1].source_column.clone()
                } else {
                    let key = m.key.as_ref().ok_or_else(|| {
                        Error::invalid_schema(format!(
                            "feature property `{name}` has neither a key column nor a join table"
                        ))
                    })?;
                    key.as_column()
                        .ok_or_else(|| {
                            Error::unsupported(format!(
                                "feature property `{name}` maps its key to a computed expression"
                            ))
                        })?
                        .column
                        .clone()
                };
                select.columns.push(sql::Expr::column(Some(alias), column));
                tys.push(self.target_fid_ty(&m.target));
                ValuePlan::FeatureKey {
                    index: 0,
                    target: m.target.clone(),
                }
            }
            Mapping::Compound(m) => {
                let mut children = vec![];
                for (child_name, child) in &m.children {
                    if child.join().is_some() {
                        return Err(Error::unsupported(format!(
                            "property `{name}.{child_name}`: join chains do not nest"
                        )));
                    }
                    let index = select.columns.len();
                    match child {
                        Mapping::Primitive(c) => {
                            select.columns.push(lower_mapping_expr(Some(alias), &c.expr));
                            tys.push(c.ty);
                            children.push((child_name.clone(), ValuePlan::Primitive { index }));
                        }
                        Mapping::Geometry(c) => {
                            select.columns.push(lower_mapping_expr(Some(alias), &c.expr));
                            tys.push(Type::Bytes);
                            children.push((
                                child_name.clone(),
                                ValuePlan::Geometry {
                                    index,
                                    crs: c.crs.clone(),
                                },
                            ));
                        }
                        Mapping::Feature(c) => {
                            let key = c.key.as_ref().ok_or_else(|| {
                                Error::invalid_schema(format!(
                                    "feature property `{name}.{child_name}` has no key column"
                                ))
                            })?;
                            select.columns.push(lower_mapping_expr(Some(alias), key));
                            tys.push(self.target_fid_ty(&c.target));
                            children.push((
                                child_name.clone(),
                                ValuePlan::FeatureKey {
                                    index,
                                    target: c.target.clone(),
                                },
                            ));
                        }
                        Mapping::Compound(_) => {
                            return Err(Error::unsupported(format!(
                                "property `{name}.{child_name}`: compound values do not nest \
                                 inside joined compounds"
                            )));
                        }
                    }
                }
                ValuePlan::Complex { children }
            }
        };

        // The runtime key parameter; Null is a placeholder in the template
        select.filter = Some(sql::Expr::eq(
            sql::Expr::column(Some(alias), &step.target_column),
            sql::Expr::Value(Value::Null),
        ));

        let mut params: Vec<Value> = vec![];
        let sql = super::serializer(self.dialect)
            .serialize(&loam_sql::Statement::Select(select), &mut params);

        Ok(JoinedPlan {
            name: name.to_string(),
            sql,
            params,
            tys,
            shape,
        })
    }
}

/// A resolved property reference: the SQL expression plus, for
/// feature-reference keys, the referenced type (whose id convention rewrites
/// comparison values).
struct ResolvedColumn {
    expr: sql::Expr,
    feature_target: Option<String>,
}

/// Lowers filter fragments. `Err(())` means "unmappable": the fragment moves
/// to the residual, never failing the query.
struct Lowerer<'a> {
    schema: &'a Schema,
    aliases: &'a mut Aliases,
    relational: Option<(&'a FeatureTypeMapping, String)>,
    blob: Option<(&'a BlobMapping, String)>,
    joins: Vec<sql::Join>,
}

impl Lowerer<'_> {
    fn lower(&mut self, expr: &Expr) -> LowerResult<sql::Expr> {
        match expr {
            Expr::And(e) => {
                let operands = e
                    .operands
                    .iter()
                    .map(|o| self.lower(o))
                    .collect::<LowerResult<Vec<_>>>()?;
                Ok(sql::Expr::And(operands))
            }
            Expr::Or(e) => {
                let operands = e
                    .operands
                    .iter()
                    .map(|o| self.lower(o))
                    .collect::<LowerResult<Vec<_>>>()?;
                Ok(sql::Expr::Or(operands))
            }
            Expr::Not(e) => Ok(sql::Expr::Not(Box::new(self.lower(&e.operand)?))),
            Expr::BinaryOp(e) => self.lower_binary(&e.lhs, e.op, &e.rhs),
            Expr::Between(e) => {
                let resolved = self.lower_operand(&e.expr)?;
                let low = self.lower_value_operand(&e.low, &resolved)?;
                let high = self.lower_value_operand(&e.high, &resolved)?;
                Ok(sql::Expr::Between {
                    expr: Box::new(resolved.expr),
                    low: Box::new(low),
                    high: Box::new(high),
                })
            }
            Expr::IsNull(e) => {
                let resolved = self.resolve_property(&e.property)?;
                Ok(sql::Expr::IsNull {
                    expr: Box::new(resolved.expr),
                    negate: e.negate,
                })
            }
            Expr::Like(e) => {
                let resolved = self.resolve_property(&e.property)?;
                if resolved.feature_target.is_some() {
                    return Err(());
                }
                Ok(sql::Expr::Like {
                    expr: Box::new(resolved.expr),
                    pattern: e.pattern.clone(),
                })
            }
            Expr::Bbox(e) => self.lower_bbox(e.property.as_ref(), &e.envelope),
            Expr::Property(_) | Expr::Value(_) => Err(()),
        }
    }

    fn lower_operand(&mut self, expr: &Expr) -> LowerResult<ResolvedColumn> {
        match expr {
            Expr::Property(property) => self.resolve_property(&property.path),
            _ => Err(()),
        }
    }

    fn lower_binary(&mut self, lhs: &Expr, op: BinaryOp, rhs: &Expr) -> LowerResult<sql::Expr> {
        // Normalize to property-op-value; value-op-property flips sides
        let (property, value, op) = match (lhs, rhs) {
            (Expr::Property(p), value) => (p, value, op),
            (value, Expr::Property(p)) => {
                let flipped = match op {
                    BinaryOp::Eq => BinaryOp::Eq,
                    BinaryOp::Ne => BinaryOp::Ne,
                    BinaryOp::Ge => BinaryOp::Le,
                    BinaryOp::Gt => BinaryOp::Lt,
                    BinaryOp::Le => BinaryOp::Ge,
                    BinaryOp::Lt => BinaryOp::Gt,
                };
                (p, value, flipped)
            }
            _ => return Err(()),
        };

        let resolved = self.resolve_property(&property.path)?;
        let value = self.lower_value_operand(value, &resolved)?;

        Ok(sql::Expr::binary_op(resolved.expr, op, value))
    }

    /// Lowers the value side of a comparison. Values compared against a
    /// feature-reference key are document-level ids; they are rewritten to
    /// the referenced type's id-kernel.
    fn lower_value_operand(
        &mut self,
        expr: &Expr,
        resolved: &ResolvedColumn,
    ) -> LowerResult<sql::Expr> {
        let Expr::Value(value) = expr else {
            return Err(());
        };

        let Some(target) = &resolved.feature_target else {
            return Ok(sql::Expr::Value(value.clone()));
        };

        match value {
            Value::String(id) => {
                let mapping = self.schema.types.get(target).ok_or(())?;
                let kernel = mapping
                    .fid
                    .parse_id(&FeatureId::new(id.clone()))
                    .map_err(|_| ())?;
                match kernel {
                    Some(kernel) => Ok(sql::Expr::Value(kernel)),
                    // Not this type's convention; the residual evaluator
                    // compares full id strings instead
                    None => Err(()),
                }
            }
            other => Ok(sql::Expr::Value(other.clone())),
        }
    }

    fn resolve_property(&mut self, path: &Path) -> LowerResult<ResolvedColumn> {
        let (mapping, root) = match &self.relational {
            Some((mapping, root)) => (*mapping, root.clone()),
            None => return Err(()),
        };
        let Some(resolved) = mapping.resolve(path) else {
            return Err(());
        };

        let alias = match resolved.join() {
            None => root,
            Some(chain) => {
                let step = &chain.steps()[0];
                let alias = self.aliases.alloc();
                self.joins.push(sql::Join {
                    table: step.table.clone(),
                    alias: alias.clone(),
                    on: sql::Expr::eq(
                        sql::Expr::column(Some(&alias), &step.target_column),
                        sql::Expr::column(Some(&root), &step.source_column),
                    ),
                });
                alias
            }
        };

        match resolved {
            Mapping::Primitive(m) => Ok(ResolvedColumn {
                expr: lower_mapping_expr(Some(&alias), &m.expr),
                feature_target: None,
            }),
            Mapping::Feature(m) => {
                let expr = match resolved.join() {
                    Some(chain) if chain.is_join_table() => {
                        sql::Expr::column(Some(&alias), &chain.steps()[1].source_column)
                    }
                    _ => {
                        let key = m.key.as_ref().ok_or(())?;
                        lower_mapping_expr(Some(&alias), key)
                    }
                };
                Ok(ResolvedColumn {
                    expr,
                    feature_target: Some(m.target.clone()),
                })
            }
            // Geometries only participate through bounding-box predicates,
            // and compound values cannot be compared wholesale
            Mapping::Geometry(_) | Mapping::Compound(_) => Err(()),
        }
    }

    /// Bounding-box predicates compile against the BLOB table's indexed
    /// bounding-box columns. A predicate naming a specific geometry property
    /// stays residual (the indexed box covers the whole feature), as does
    /// any bounding box in pure relational storage.
    fn lower_bbox(&mut self, property: Option<&Path>, envelope: &Envelope) -> LowerResult<sql::Expr> {
        if property.is_some() {
            return Err(());
        }
        let Some((blob, alias)) = &self.blob else {
            return Err(());
        };

        let column = |name: &str| sql::Expr::column(Some(alias), name);
        Ok(sql::Expr::And(vec![
            sql::Expr::binary_op(
                column(&blob.bbox.max_x),
                BinaryOp::Ge,
                sql::Expr::value(envelope.min_x),
            ),
            sql::Expr::binary_op(
                column(&blob.bbox.min_x),
                BinaryOp::Le,
                sql::Expr::value(envelope.max_x),
            ),
            sql::Expr::binary_op(
                column(&blob.bbox.max_y),
                BinaryOp::Ge,
                sql::Expr::value(envelope.min_y),
            ),
            sql::Expr::binary_op(
                column(&blob.bbox.min_y),
                BinaryOp::Le,
                sql::Expr::value(envelope.max_y),
            ),
        ]))
    }

    fn lower_order(&mut self, order_by: &OrderBy) -> Option<Vec<sql::OrderByColumn>> {
        // All-or-nothing: a partially pushed sort would yield wrong order
        let mut ret = vec![];
        for expr in &order_by.exprs {
            let resolved = self.resolve_property(&expr.property).ok()?;
            ret.push(sql::OrderByColumn {
                expr: resolved.expr,
                desc: expr.desc,
            });
        }
        Some(ret)
    }
}

fn lower_mapping_expr(alias: Option<&str>, expr: &MappingExpression) -> sql::Expr {
    match expr {
        MappingExpression::Column(column) => match &column.table {
            Some(table) => sql::Expr::column(Some(table), &column.column),
            None => sql::Expr::column(alias, &column.column),
        },
        MappingExpression::Function { name, args } => sql::Expr::func(
            name.clone(),
            args.iter().map(|arg| lower_mapping_expr(alias, arg)).collect(),
        ),
        MappingExpression::Constant(value) => sql::Expr::Value(Value::String(value.clone())),
    }
}
