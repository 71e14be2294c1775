//! Pagination utilities for list endpoints

use serde::{Deserialize, Serialize};

/// Page size constant for all pagination
pub const PAGE_SIZE: i64 = 100;

/// Page number query parameter (1-indexed)
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Paging envelope returned by list endpoints
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_rows: i64,
    pub items: Vec<T>,
}

impl<T> Paged<T> {
    pub fn new(pagination: Pagination, total_rows: i64, items: Vec<T>) -> Self {
        Self {
            page: pagination.page,
            page_size: PAGE_SIZE,
            total_pages: pagination.total_pages,
            total_rows,
            items,
        }
    }
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use medform_server::pagination::calculate_pagination;
///
/// // 250 total results = 3 pages (100 + 100 + 50)
/// let p = calculate_pagination(250, 2);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 100);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(250, 99);
/// assert_eq!(p.page, 3);  // Clamped to last page
/// assert_eq!(p.offset, 200);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * PAGE_SIZE;

    Pagination {
        page,
        total_pages,
        offset,
    }
}
