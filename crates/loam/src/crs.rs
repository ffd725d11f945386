use loam_core::feature::{Crs, Geometry};
use loam_core::Result;

/// Transforms geometries between coordinate reference systems.
///
/// Fails with a transformation error when no path between the systems
/// exists.
pub trait CrsTransformer: Send + Sync {
    fn transform(&self, geometry: &Geometry, target: &Crs) -> Result<Geometry>;
}

/// A transformer usable when every geometry already is in the storage CRS.
#[derive(Debug, Default)]
pub struct IdentityTransformer;

impl CrsTransformer for IdentityTransformer {
    fn transform(&self, geometry: &Geometry, target: &Crs) -> Result<Geometry> {
        let mut ret = geometry.clone();
        ret.crs = target.clone();
        Ok(ret)
    }
}
