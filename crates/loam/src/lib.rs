mod cache;
pub use cache::{FeatureCache, MemoryCache, NullCache};

mod codec;
pub use codec::{GeometryCodec, PayloadCodec, RawGeometryCodec};

mod crs;
pub use crs::{CrsTransformer, IdentityTransformer};

mod cursor;
pub use cursor::FeatureCursor;

mod engine;
pub use engine::insert::IdMode;

mod query;
pub use query::Query;

mod resolver;
pub use resolver::{NullResolver, ReferenceResolver};

mod store;
pub use store::{Store, StoreBuilder};

mod transaction;
pub use transaction::Transaction;

pub use loam_core::{
    feature::{Crs, Envelope, Feature, FeatureId, FeatureRef, Geometry, Property, PropertyValue},
    schema, stmt, Error, Result, Schema,
};
