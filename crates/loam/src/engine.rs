pub(crate) mod delete;
pub(crate) mod envelope;
pub(crate) mod ids;
pub(crate) mod insert;
pub(crate) mod materialize;
pub(crate) mod translate;

use crate::cache::FeatureCache;
use crate::codec::{GeometryCodec, PayloadCodec};
use crate::crs::CrsTransformer;
use crate::resolver::ReferenceResolver;
use loam_core::driver::SqlDialect;
use loam_core::feature::Crs;
use loam_core::{Error, Result, Schema};

use std::sync::Arc;

/// Everything a query or transaction needs besides its connection.
///
/// All members are read-only shared handles; the context is cloned freely
/// into cursors and transactions.
#[derive(Clone)]
pub(crate) struct EngineContext {
    pub schema: Arc<Schema>,
    pub dialect: SqlDialect,
    pub cache: Arc<dyn FeatureCache>,
    pub geometry_codec: Arc<dyn GeometryCodec>,
    pub payload_codec: Option<Arc<dyn PayloadCodec>>,
    pub resolver: Arc<dyn ReferenceResolver>,
    pub crs_transformer: Arc<dyn CrsTransformer>,
    pub storage_crs: Crs,
}

impl EngineContext {
    pub(crate) fn payload_codec(&self) -> Result<&Arc<dyn PayloadCodec>> {
        self.payload_codec
            .as_ref()
            .ok_or_else(|| Error::invalid_schema("BLOB storage requires a payload codec"))
    }

    pub(crate) fn serializer(&self) -> loam_sql::Serializer {
        serializer(self.dialect)
    }
}

pub(crate) fn serializer(dialect: SqlDialect) -> loam_sql::Serializer {
    match dialect {
        SqlDialect::Postgresql => loam_sql::Serializer::postgresql(),
        SqlDialect::Sqlite => loam_sql::Serializer::sqlite(),
    }
}
