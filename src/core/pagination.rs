//! Pagination query parameters and response envelope

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

/// `?page=&limit=` query parameters with the API's defaults.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    DEFAULT_PAGE
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageQuery {
    /// Normalize out-of-range values (page >= 1, 1 <= limit <= 100).
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }

    fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

/// Pagination metadata echoed alongside every list response.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// A page of results plus its pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    /// Slice an already-filtered, already-ordered result set into a page.
    pub fn slice(items: Vec<T>, query: PageQuery) -> Self {
        let query = query.clamped();
        let total = items.len();
        let data: Vec<T> = items
            .into_iter()
            .skip(query.offset())
            .take(query.limit)
            .collect();
        Self {
            data,
            pagination: PageInfo {
                page: query.page,
                limit: query.limit,
                total,
                total_pages: total.div_ceil(query.limit),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let q = PageQuery::default();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
    }

    #[test]
    fn slices_the_requested_page() {
        let items: Vec<u32> = (0..25).collect();
        let page = Paginated::slice(items, PageQuery { page: 3, limit: 10 });
        assert_eq!(page.data, vec![20, 21, 22, 23, 24]);
        assert_eq!(page.pagination.total, 25);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[test]
    fn clamps_invalid_values() {
        let q = PageQuery { page: 0, limit: 0 }.clamped();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 1);

        let q = PageQuery {
            page: 1,
            limit: 10_000,
        }
        .clamped();
        assert_eq!(q.limit, 100);
    }

    #[test]
    fn empty_set_has_zero_pages() {
        let page = Paginated::<u32>::slice(vec![], PageQuery::default());
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
    }
}
