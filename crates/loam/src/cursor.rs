use crate::engine::materialize::Materializer;
use crate::engine::translate::Residual;

use loam_core::driver::{Connection, Rows};
use loam_core::feature::Feature;
use loam_core::stmt::{self, OrderBy};
use loam_core::Result;

use std::cmp::Ordering;
use std::sync::Arc;

/// A lazy, forward-only, single-pass sequence of features.
///
/// The cursor owns its connection for its whole lifetime; dropping the
/// cursor, at any point, releases the underlying statement and connection.
/// It is not restartable.
pub struct FeatureCursor {
    inner: Inner,
}

enum Inner {
    /// Rows stream through the materializer as the caller advances.
    Rows {
        conn: Box<dyn Connection>,
        rows: Rows,
        materializer: Materializer,

        /// Residual filter conjuncts applied per feature.
        filter: Vec<stmt::Expr>,

        /// In-memory paging, active when a residual filter withheld paging
        /// from the statement.
        skip: u64,
        remaining: Option<u64>,
    },

    /// Fully materialized up front (residual sorts need the complete result
    /// set before anything can be yielded).
    Collected {
        features: std::vec::IntoIter<Arc<Feature>>,
    },
}

impl std::fmt::Debug for FeatureCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureCursor").finish_non_exhaustive()
    }
}

impl FeatureCursor {
    pub(crate) fn lazy(
        conn: Box<dyn Connection>,
        rows: Rows,
        materializer: Materializer,
        residual: &Residual,
    ) -> FeatureCursor {
        let (skip, remaining) = match residual.page {
            Some(page) => (page.offset, page.limit),
            None => (0, None),
        };

        FeatureCursor {
            inner: Inner::Rows {
                conn,
                rows,
                materializer,
                filter: residual.filter.clone(),
                skip,
                remaining,
            },
        }
    }

    pub(crate) fn collected(features: Vec<Arc<Feature>>) -> FeatureCursor {
        FeatureCursor {
            inner: Inner::Collected {
                features: features.into_iter(),
            },
        }
    }
}

impl Iterator for FeatureCursor {
    type Item = Result<Arc<Feature>>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Collected { features } => features.next().map(Ok),
            Inner::Rows {
                conn,
                rows,
                materializer,
                filter,
                skip,
                remaining,
            } => {
                if *remaining == Some(0) {
                    return None;
                }

                loop {
                    let row = rows.next()?;

                    let feature = match materializer.build_feature(&mut **conn, row) {
                        Ok(feature) => feature,
                        Err(err) => return Some(Err(err)),
                    };

                    match matches(filter, &feature) {
                        Ok(true) => {}
                        Ok(false) => continue,
                        Err(err) => return Some(Err(err)),
                    }

                    if *skip > 0 {
                        *skip -= 1;
                        continue;
                    }
                    if let Some(remaining) = remaining {
                        *remaining -= 1;
                    }

                    return Some(Ok(feature));
                }
            }
        }
    }
}

fn matches(filter: &[stmt::Expr], feature: &Feature) -> Result<bool> {
    for conjunct in filter {
        if !conjunct.eval(feature)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Residual sort: stable, null values first, later keys break ties.
pub(crate) fn sort_features(features: &mut [Arc<Feature>], order_by: &OrderBy) {
    features.sort_by(|a, b| {
        for key in &order_by.exprs {
            let left = stmt::property_value(a, &key.property);
            let right = stmt::property_value(b, &key.property);

            let ordering = match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => left.compare(&right).unwrap_or(Ordering::Equal),
            };
            let ordering = if key.desc { ordering.reverse() } else { ordering };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}
