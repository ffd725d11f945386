use loam_core::feature::Envelope;
use loam_core::stmt::{Expr, OrderBy, Page};

/// A query against one feature type.
///
/// Queries spanning more than one type name are not supported; the id-set
/// path ([`Store::query_ids`](crate::Store::query_ids)) is the only
/// multi-type entry point, and only in BLOB-backed storage.
#[derive(Debug, Clone)]
pub struct Query {
    pub type_name: String,

    /// Operator filter tree. `None` selects every feature of the type.
    pub filter: Option<Expr>,

    /// Coarse spatial prefilter, applied against the indexed bounding box
    /// where storage allows, residually otherwise.
    pub bbox: Option<Envelope>,

    pub order_by: OrderBy,

    pub page: Page,
}

impl Query {
    pub fn new(type_name: impl Into<String>) -> Query {
        Query {
            type_name: type_name.into(),
            filter: None,
            bbox: None,
            order_by: OrderBy::default(),
            page: Page::default(),
        }
    }

    pub fn filter(mut self, filter: Expr) -> Query {
        self.filter = Some(filter);
        self
    }

    pub fn bbox(mut self, bbox: Envelope) -> Query {
        self.bbox = Some(bbox);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Query {
        self.order_by = order_by;
        self
    }

    pub fn page(mut self, page: Page) -> Query {
        self.page = page;
        self
    }
}
