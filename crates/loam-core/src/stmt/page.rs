/// Paging directives.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Page {
    pub limit: Option<u64>,
    pub offset: u64,
}

impl Page {
    pub fn limit(limit: u64) -> Page {
        Page {
            limit: Some(limit),
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Page {
        self.offset = offset;
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit.is_none() && self.offset == 0
    }
}
