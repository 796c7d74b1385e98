//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self { page: page.unwrap_or(1), per_page: per_page.unwrap_or(DEFAULT_PER_PAGE) }
    }

    /// Clamp to sane defaults and convert to `u64` (0-based page index, page size)
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        ((page - 1) as u64, per_page as u64)
    }

    /// Number of items to skip.
    pub fn offset(self) -> u64 {
        let (idx, per) = self.normalize();
        idx * per
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: DEFAULT_PER_PAGE } }
}

/// One page of a listing plus the total across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let (idx, per) = pagination.normalize();
        Self { items, total, page: idx as u32 + 1, per_page: per as u32 }
    }

    /// Whether pages after this one hold items.
    pub fn has_more(&self) -> bool {
        (self.page as u64) * (self.per_page as u64) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
        assert_eq!(Pagination::new(None, None), d);
    }

    #[test]
    fn offset_and_has_more() {
        let p = Pagination { page: 3, per_page: 10 };
        assert_eq!(p.offset(), 20);
        let page: Page<u8> = Page::new(vec![1; 10], 31, p);
        assert!(page.has_more());
        let last: Page<u8> = Page::new(vec![1], 31, Pagination { page: 4, per_page: 10 });
        assert!(!last.has_more());
    }
}
