use crate::cache::{FeatureCache, NullCache};
use crate::codec::{GeometryCodec, PayloadCodec, RawGeometryCodec};
use crate::crs::{CrsTransformer, IdentityTransformer};
use crate::cursor::{self, FeatureCursor};
use crate::engine::materialize::Materializer;
use crate::engine::{self, translate, EngineContext};
use crate::query::Query;
use crate::resolver::{NullResolver, ReferenceResolver};
use crate::transaction::Transaction;

use loam_core::driver::{Connection, Driver};
use loam_core::feature::{Crs, Envelope, Feature, FeatureId};
use loam_core::{err, Error, Result, Schema};

use std::sync::Arc;

/// The feature store: the compiled schema, a database connector, and the
/// injected collaborators.
///
/// The store itself holds no mutable state; each query or transaction
/// acquires its own connection for its duration.
pub struct Store {
    driver: Box<dyn Driver>,
    cx: EngineContext,
}

impl Store {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    pub fn schema(&self) -> &Schema {
        &self.cx.schema
    }

    /// Runs a query, returning a lazy, forward-only feature sequence.
    ///
    /// Dropping the returned cursor at any point releases its statement and
    /// connection.
    pub fn query(&self, query: Query) -> Result<FeatureCursor> {
        let translated = translate::translate_query(&self.cx.schema, &query, self.cx.dialect)?;
        let (statement, params) = translated.serialize(self.cx.dialect);
        tracing::debug!(sql = %statement, "query");

        let mut conn = self.connect()?;
        let rows = conn.query(&statement, &params, &translated.tys)?;
        let materializer = Materializer::new(self.cx.clone(), translated.plan);

        if !translated.residual.needs_collect() {
            return Ok(FeatureCursor::lazy(
                conn,
                rows,
                materializer,
                &translated.residual,
            ));
        }

        // A residual sort needs every matching feature in hand first
        let mut features = vec![];
        'rows: for row in rows {
            let feature = materializer.build_feature(&mut *conn, row)?;
            for conjunct in &translated.residual.filter {
                if !conjunct.eval(&feature)? {
                    continue 'rows;
                }
            }
            features.push(feature);
        }

        cursor::sort_features(&mut features, &translated.residual.order_by);

        if let Some(page) = translated.residual.page {
            let limit = page.limit.map(|l| l as usize).unwrap_or(usize::MAX);
            features = features
                .into_iter()
                .skip(page.offset as usize)
                .take(limit)
                .collect();
        }

        Ok(FeatureCursor::collected(features))
    }

    /// Fetches features by id set.
    pub fn query_ids(&self, ids: &[FeatureId]) -> Result<FeatureCursor> {
        if ids.is_empty() {
            return Ok(FeatureCursor::collected(vec![]));
        }

        let mut conn = self.connect()?;
        let (rows, plan) = engine::ids::run_id_query(&self.cx, &mut *conn, ids)?;
        let materializer = Materializer::new(self.cx.clone(), plan);

        Ok(FeatureCursor::lazy(
            conn,
            rows,
            materializer,
            &translate::Residual::default(),
        ))
    }

    pub fn get_by_id(&self, id: &FeatureId) -> Result<Option<Arc<Feature>>> {
        let mut cursor = self.query_ids(std::slice::from_ref(id))?;
        cursor.next().transpose()
    }

    /// Counts the features a query would return.
    pub fn count(&self, query: Query) -> Result<u64> {
        if let Some((statement, params)) =
            translate::translate_count(&self.cx.schema, &query, self.cx.dialect)?
        {
            let mut conn = self.connect()?;
            let mut rows = conn.query(&statement, &params, &[loam_core::stmt::Type::I64])?;
            let count = match rows.next() {
                Some(row) => row.get(0).clone().to_i64()?,
                None => 0,
            };
            return Ok(count as u64);
        }

        // Residual filtering (or a row-multiplying join) forces counting
        // materialized features
        let mut count = 0u64;
        for feature in self.query(query)? {
            feature?;
            count += 1;
        }
        Ok(count)
    }

    /// The aggregate bounding box of one feature type.
    pub fn envelope(&self, type_name: &str) -> Result<Option<Envelope>> {
        let mut conn = self.connect()?;
        engine::envelope::execute(&self.cx, &mut *conn, type_name)
    }

    /// Opens a write transaction on its own connection.
    pub fn transaction(&self) -> Result<Transaction> {
        let mut conn = self.connect()?;
        conn.begin()?;
        Ok(Transaction::new(self.cx.clone(), conn))
    }

    fn connect(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect()
    }
}

/// Configures and builds a [`Store`].
pub struct StoreBuilder {
    schema: Option<Schema>,
    driver: Option<Box<dyn Driver>>,
    cache: Option<Arc<dyn FeatureCache>>,
    geometry_codec: Option<Arc<dyn GeometryCodec>>,
    payload_codec: Option<Arc<dyn PayloadCodec>>,
    resolver: Option<Arc<dyn ReferenceResolver>>,
    crs_transformer: Option<Arc<dyn CrsTransformer>>,
    storage_crs: Option<Crs>,
}

impl StoreBuilder {
    fn new() -> StoreBuilder {
        StoreBuilder {
            schema: None,
            driver: None,
            cache: None,
            geometry_codec: None,
            payload_codec: None,
            resolver: None,
            crs_transformer: None,
            storage_crs: None,
        }
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn driver(mut self, driver: impl Driver + 'static) -> Self {
        self.driver = Some(Box::new(driver));
        self
    }

    pub fn cache(mut self, cache: Arc<dyn FeatureCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn geometry_codec(mut self, codec: Arc<dyn GeometryCodec>) -> Self {
        self.geometry_codec = Some(codec);
        self
    }

    pub fn payload_codec(mut self, codec: Arc<dyn PayloadCodec>) -> Self {
        self.payload_codec = Some(codec);
        self
    }

    pub fn reference_resolver(mut self, resolver: Arc<dyn ReferenceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn crs_transformer(mut self, transformer: Arc<dyn CrsTransformer>) -> Self {
        self.crs_transformer = Some(transformer);
        self
    }

    pub fn storage_crs(mut self, crs: Crs) -> Self {
        self.storage_crs = Some(crs);
        self
    }

    pub fn build(self) -> Result<Store> {
        let schema = self.schema.ok_or_else(|| err!("store requires a schema"))?;
        let driver = self
            .driver
            .ok_or_else(|| err!("store requires a database driver"))?;

        let payload_codec = self.payload_codec;
        if schema.mode.is_blob_backed() && payload_codec.is_none() {
            return Err(Error::invalid_schema(
                "BLOB storage requires a payload codec",
            ));
        }

        let cx = EngineContext {
            schema: Arc::new(schema),
            dialect: driver.dialect(),
            cache: self.cache.unwrap_or_else(|| Arc::new(NullCache)),
            geometry_codec: self
                .geometry_codec
                .unwrap_or_else(|| Arc::new(RawGeometryCodec)),
            payload_codec,
            resolver: self.resolver.unwrap_or_else(|| Arc::new(NullResolver)),
            crs_transformer: self
                .crs_transformer
                .unwrap_or_else(|| Arc::new(IdentityTransformer)),
            storage_crs: self.storage_crs.unwrap_or_else(|| Crs::new("EPSG:4326")),
        };

        Ok(Store { driver, cx })
    }
}
