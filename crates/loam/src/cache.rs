use loam_core::feature::{Feature, FeatureId};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The object cache consulted by the BLOB materializer.
///
/// The cache is the one resource shared across concurrent requests. It has
/// no transactional semantics: a decode race producing two equal-but-distinct
/// in-memory features for the same id is tolerated, last write wins. No
/// eviction contract is assumed beyond "bounded size, may evict
/// arbitrarily".
pub trait FeatureCache: Send + Sync {
    fn get(&self, id: &FeatureId) -> Option<Arc<Feature>>;

    fn add(&self, feature: Arc<Feature>);
}

/// A cache that never stores anything.
#[derive(Debug, Default)]
pub struct NullCache;

impl FeatureCache for NullCache {
    fn get(&self, _id: &FeatureId) -> Option<Arc<Feature>> {
        None
    }

    fn add(&self, _feature: Arc<Feature>) {}
}

/// A simple unbounded in-memory cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<FeatureId, Arc<Feature>>>,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FeatureCache for MemoryCache {
    fn get(&self, id: &FeatureId) -> Option<Arc<Feature>> {
        self.entries.lock().unwrap().get(id).cloned()
    }

    fn add(&self, feature: Arc<Feature>) {
        let Some(id) = feature.id.clone() else {
            return;
        };
        self.entries.lock().unwrap().insert(id, feature);
    }
}
