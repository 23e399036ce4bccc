//! Pagination envelope and client-side slicing.
//!
//! List endpoints switch between a flat shape and this envelope depending on
//! whether the caller supplied any pagination parameter. The slice is computed
//! over the fully materialized result set, so the same arguments always
//! produce the same page.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// The shape returned when an upstream cannot serve a paginated read.
    pub fn empty(page: usize, page_size: usize) -> Self {
        Page {
            items: Vec::new(),
            total: 0,
            page,
            page_size,
            total_pages: 0,
        }
    }
}

/// Slices one page out of a full result set.
///
/// `page` and `page_size` are clamped to a minimum of 1. Invariants:
/// `items.len() <= page_size` and `total_pages == 0` iff `total == 0`.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);

    let items: Vec<T> = items.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        total,
        page,
        page_size,
        total_pages,
    }
}
