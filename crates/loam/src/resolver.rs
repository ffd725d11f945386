use loam_core::feature::{Feature, FeatureId};
use loam_core::Result;

/// Resolves feature references on demand.
///
/// Unresolved feature-reference properties carry only an id; following them
/// goes through this resolver rather than eager traversal, which keeps
/// single-feature fetches from walking unbounded graphs.
pub trait ReferenceResolver: Send + Sync {
    fn resolve(&self, id: &FeatureId) -> Result<Option<Feature>>;
}

/// A resolver that resolves nothing.
#[derive(Debug, Default)]
pub struct NullResolver;

impl ReferenceResolver for NullResolver {
    fn resolve(&self, _id: &FeatureId) -> Result<Option<Feature>> {
        Ok(None)
    }
}
