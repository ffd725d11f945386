use super::BlobPlan;
use crate::engine::EngineContext;
use loam_core::driver::Row;
use loam_core::feature::Feature;
use loam_core::{Error, Result};

use std::sync::Arc;

pub(crate) struct BlobMaterializer {
    cx: EngineContext,
    plan: BlobPlan,
}

impl BlobMaterializer {
    pub(crate) fn new(cx: EngineContext, plan: BlobPlan) -> BlobMaterializer {
        BlobMaterializer { cx, plan }
    }

    pub(crate) fn build_feature(&self, mut row: Row) -> Result<Arc<Feature>> {
        let kernel = row.take(0);

        let type_name = match &self.plan.type_name {
            Some(name) => name.clone(),
            None => {
                let discriminator = row.get(1).clone().to_i64()? as u16;
                self.cx
                    .schema
                    .feature_type_by_discriminator(discriminator)
                    .ok_or_else(|| {
                        Error::codec(format!("unknown type discriminator {discriminator}"))
                    })?
                    .name
                    .clone()
            }
        };

        let mapping = self.cx.schema.feature_type(&type_name)?;
        let fid = mapping.fid.format_id(&kernel);

        // A cache hit skips the payload entirely
        if let Some(feature) = self.cx.cache.get(&fid) {
            return Ok(feature);
        }

        let payload_index = if self.plan.has_type_column { 2 } else { 1 };
        let payload = row.take(payload_index).to_bytes().map_err(|_| {
            Error::codec(format!("feature `{fid}` has no payload"))
        })?;

        let codec = self.cx.payload_codec()?;
        let mut feature = codec.decode(
            &payload,
            &self.cx.schema,
            &self.cx.storage_crs,
            &*self.cx.resolver,
        )?;
        if feature.id.is_none() {
            feature.id = Some(fid);
        }

        let feature = Arc::new(feature);

        // Population is a tolerated side effect. A concurrent decode of the
        // same id may race here; last write wins, and decode is pure.
        self.cx.cache.add(feature.clone());

        Ok(feature)
    }
}
