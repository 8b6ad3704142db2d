//! Query Builder pagination operations

use super::builder::QueryBuilder;
use super::types::Limit;

impl QueryBuilder {
    /// Add LIMIT clause; the offset goes back to 0
    pub fn limit(self, count: u64) -> Self {
        self.limit_offset(count, 0)
    }

    /// Add LIMIT and OFFSET together
    pub fn limit_offset(mut self, count: u64, offset: u64) -> Self {
        self.limit_count = Some(count);
        self.offset_value = offset;
        self
    }

    /// Add OFFSET clause; only rendered together with a limit
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_value = offset;
        self
    }

    /// Add pagination (LIMIT + OFFSET), pages start at 1
    pub fn paginate(self, per_page: u64, page: u64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.limit_offset(per_page, offset)
    }

    /// Effective LIMIT/OFFSET pair
    pub fn current_limit(&self) -> Option<Limit> {
        self.limit_count.map(|count| Limit {
            count,
            offset: self.offset_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_defaults_to_zero() {
        let builder = QueryBuilder::new().table("x").limit(2);
        assert_eq!(builder.current_limit(), Some(Limit { count: 2, offset: 0 }));
    }

    #[test]
    fn test_limit_resets_earlier_offset() {
        let builder = QueryBuilder::new().table("x").limit_offset(20, 40).limit(5);
        assert_eq!(builder.current_limit(), Some(Limit { count: 5, offset: 0 }));

        let builder = QueryBuilder::new().table("x").limit(5).offset(10);
        assert_eq!(builder.current_limit(), Some(Limit { count: 5, offset: 10 }));
    }

    #[test]
    fn test_offset_without_limit_is_not_rendered() {
        let builder = QueryBuilder::new().table("x").offset(10);
        assert_eq!(builder.current_limit(), None);
    }

    #[test]
    fn test_paginate_is_one_based() {
        let builder = QueryBuilder::new().table("x").paginate(15, 3);
        assert_eq!(builder.current_limit(), Some(Limit { count: 15, offset: 30 }));

        let builder = QueryBuilder::new().table("x").paginate(15, 0);
        assert_eq!(builder.current_limit(), Some(Limit { count: 15, offset: 0 }));
    }
}
