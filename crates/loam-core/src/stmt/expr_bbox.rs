use super::{Expr, Path};
use crate::feature::Envelope;

/// A bounding-box predicate against a geometry property.
///
/// Semantics are the envelope-overlap test: the predicate holds when the
/// property's envelope intersects the query envelope. In BLOB and hybrid
/// storage this compiles to comparisons against the indexed bounding-box
/// columns; in pure relational storage it is evaluated residually against
/// decoded geometry envelopes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprBbox {
    /// The geometry property to test. `None` selects the feature type's
    /// first geometry property.
    pub property: Option<Path>,

    pub envelope: Envelope,
}

impl Expr {
    pub fn bbox(envelope: Envelope) -> Self {
        ExprBbox {
            property: None,
            envelope,
        }
        .into()
    }

    pub fn bbox_of(property: impl Into<Path>, envelope: Envelope) -> Self {
        ExprBbox {
            property: Some(property.into()),
            envelope,
        }
        .into()
    }
}

impl From<ExprBbox> for Expr {
    fn from(value: ExprBbox) -> Self {
        Self::Bbox(value)
    }
}
