use serde::Serialize;

/// Page size used by listing views.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Row offset for the requested page. Page `0` is treated as page `1`.
    ///
    /// Saturates instead of overflowing, since the page comes straight from
    /// the query string.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// [`Self::offset`] clamped into SQL's `OFFSET` range.
    pub fn offset_i64(&self) -> i64 {
        i64::try_from(self.offset()).unwrap_or(i64::MAX)
    }

    /// Page size clamped into SQL's `LIMIT` range.
    pub fn limit_i64(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

/// A single page of items together with navigation data for templates.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub pages: Vec<usize>,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: usize, total_pages: usize) -> Self {
        Self {
            items,
            page,
            pages: (1..=total_pages).collect(),
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            pages: self.pages,
            total_pages: self.total_pages,
        }
    }
}
