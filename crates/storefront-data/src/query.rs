//! Filter, ordering and paging parameters for repository reads.

use crate::StoreError;
use std::cmp::Ordering;

/// First page. Page indices are 1-based.
pub const DEFAULT_PAGE_INDEX: usize = 1;
/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: usize = 10;

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Parameters for [`crate::Repository::get_all`].
///
/// Results are always ordered by primary key before the caller's
/// comparator runs, so paging is deterministic.
pub struct Query<T> {
    filter: Option<Predicate<T>>,
    order_by: Option<Comparator<T>>,
    page_index: usize,
    page_size: usize,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self {
            filter: None,
            order_by: None,
            page_index: DEFAULT_PAGE_INDEX,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl<T> Query<T> {
    /// A query matching everything, first page, default size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict results to rows matching the predicate.
    pub fn filter(mut self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Order results with the given comparator.
    pub fn order_by(mut self, cmp: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.order_by = Some(Box::new(cmp));
        self
    }

    /// Select a page. `index` is 1-based; `size` must be at least 1.
    pub fn page(mut self, index: usize, size: usize) -> Self {
        self.page_index = index;
        self.page_size = size;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), StoreError> {
        if self.page_index < 1 || self.page_size < 1 {
            return Err(StoreError::InvalidPage {
                index: self.page_index,
                size: self.page_size,
            });
        }
        Ok(())
    }

    pub(crate) fn filter_ref(&self) -> Option<&Predicate<T>> {
        self.filter.as_ref()
    }

    pub(crate) fn order_ref(&self) -> Option<&Comparator<T>> {
        self.order_by.as_ref()
    }

    pub(crate) fn page_index(&self) -> usize {
        self.page_index
    }

    pub(crate) fn page_size(&self) -> usize {
        self.page_size
    }
}

/// One page of query results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Rows on this page, in query order.
    pub items: Vec<T>,
    /// 1-based index of this page.
    pub page_index: usize,
    /// Requested page size (the last page may hold fewer rows).
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Number of rows on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the page, yielding its rows.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q: Query<u32> = Query::new();
        assert_eq!(q.page_index(), 1);
        assert_eq!(q.page_size(), 10);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let q: Query<u32> = Query::new().page(1, 0);
        assert!(matches!(
            q.validate(),
            Err(StoreError::InvalidPage { index: 1, size: 0 })
        ));
    }

    #[test]
    fn test_zero_page_index_rejected() {
        let q: Query<u32> = Query::new().page(0, 10);
        assert!(q.validate().is_err());
    }
}
