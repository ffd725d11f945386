pub mod driver;
pub use driver::Connection;

mod error;
pub use error::Error;

pub mod feature;
pub use feature::{Crs, Envelope, Feature, FeatureId, Geometry};

pub mod schema;
pub use schema::Schema;

pub mod stmt;

/// A Result type alias that uses Loam's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
