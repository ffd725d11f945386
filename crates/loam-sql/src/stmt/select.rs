use super::{Expr, TableWithJoins};

#[derive(Debug, Clone)]
pub struct Select {
    /// Drop duplicate rows. Set whenever join emission can multiply primary
    /// rows.
    pub distinct: bool,

    /// Selected expressions, in order. The consumer reads result columns by
    /// position, so this order is the row contract.
    pub columns: Vec<Expr>,

    pub from: TableWithJoins,

    pub filter: Option<Expr>,

    pub order_by: Vec<OrderByColumn>,

    pub limit: Option<u64>,

    pub offset: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct OrderByColumn {
    pub expr: Expr,
    pub desc: bool,
}

impl Select {
    pub fn new(from: TableWithJoins) -> Select {
        Select {
            distinct: false,
            columns: vec![],
            from,
            filter: None,
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }
}
