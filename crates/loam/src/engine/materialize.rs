mod blob;
pub(crate) use blob::BlobMaterializer;

mod relational;
pub(crate) use relational::RelationalMaterializer;

use super::EngineContext;
use loam_core::driver::{Connection, Row};
use loam_core::feature::{Crs, Feature};
use loam_core::stmt::Type;
use loam_core::Result;

use std::sync::Arc;

/// How result rows become features. Produced by the query translator, one
/// per statement.
#[derive(Debug)]
pub(crate) enum MaterializePlan {
    Blob(BlobPlan),
    Relational(RelationalPlan),
}

/// Row layout: id, then (when `has_type_column`) the type discriminator,
/// then the payload.
#[derive(Debug)]
pub(crate) struct BlobPlan {
    /// The queried type, when the statement targets a single type.
    /// Multi-type id queries read the discriminator column instead.
    pub type_name: Option<String>,

    pub has_type_column: bool,
}

/// Row layout: fid first, then one column per mapped property in
/// mapping-declaration order. Properties behind a join chain are not part of
/// the row; each is fetched with its own follow-up query.
#[derive(Debug)]
pub(crate) struct RelationalPlan {
    pub type_name: String,

    pub properties: Vec<(String, ValuePlan)>,

    pub joined: Vec<JoinedPlan>,
}

#[derive(Debug)]
pub(crate) enum ValuePlan {
    Primitive { index: usize },
    Geometry { index: usize, crs: Crs },
    FeatureKey { index: usize, target: String },
    Complex { children: Vec<(String, ValuePlan)> },
    Joined { index: usize },
}

/// A follow-up query for one join-chained property, parametrized by the
/// primary row's key. One query per joined property per feature: relational
/// mode is reserved for narrow, well-indexed types, and this shape is kept
/// for behavioral parity rather than batched.
#[derive(Debug)]
pub(crate) struct JoinedPlan {
    pub name: String,
    pub sql: String,

    /// Parameter template; the last slot is replaced with the primary row's
    /// key at fetch time.
    pub params: Vec<loam_core::stmt::Value>,

    pub tys: Vec<Type>,
    pub shape: ValuePlan,
}

pub(crate) enum Materializer {
    Blob(BlobMaterializer),
    Relational(RelationalMaterializer),
}

impl Materializer {
    pub(crate) fn new(cx: EngineContext, plan: MaterializePlan) -> Materializer {
        match plan {
            MaterializePlan::Blob(plan) => Materializer::Blob(BlobMaterializer::new(cx, plan)),
            MaterializePlan::Relational(plan) => {
                Materializer::Relational(RelationalMaterializer::new(cx, plan))
            }
        }
    }

    /// Turns one result row into a feature. Always called in the context of
    /// an open cursor; the connection is available for joined-property
    /// fetches.
    pub(crate) fn build_feature(
        &self,
        conn: &mut dyn Connection,
        row: Row,
    ) -> Result<Arc<Feature>> {
        match self {
            Materializer::Blob(m) => m.build_feature(row),
            Materializer::Relational(m) => m.build_feature(conn, row),
        }
    }
}
