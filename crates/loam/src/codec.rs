use crate::resolver::ReferenceResolver;
use loam_core::feature::{Crs, Feature, Geometry};
use loam_core::{Result, Schema};

/// Encodes and decodes geometry values. Deterministic and pure.
pub trait GeometryCodec: Send + Sync {
    fn encode(&self, geometry: &Geometry, crs: &Crs) -> Result<Vec<u8>>;

    /// Decodes a geometry from its wire encoding. The caller tags the result
    /// with the storage CRS from the mapping.
    fn decode(&self, data: &[u8]) -> Result<Geometry>;
}

/// Encodes and decodes whole features for BLOB storage.
pub trait PayloadCodec: Send + Sync {
    fn encode(&self, feature: &Feature, crs: &Crs) -> Result<Vec<u8>>;

    fn decode(
        &self,
        data: &[u8],
        schema: &Schema,
        crs: &Crs,
        resolver: &dyn ReferenceResolver,
    ) -> Result<Feature>;
}

/// A geometry codec that treats the stored bytes as already being the wire
/// encoding. Decoded geometries carry no envelope.
#[derive(Debug, Default)]
pub struct RawGeometryCodec;

impl GeometryCodec for RawGeometryCodec {
    fn encode(&self, geometry: &Geometry, _crs: &Crs) -> Result<Vec<u8>> {
        Ok(geometry.data.clone())
    }

    fn decode(&self, data: &[u8]) -> Result<Geometry> {
        Ok(Geometry {
            id: None,
            data: data.to_vec(),
            crs: Crs::new(""),
            envelope: None,
        })
    }
}
