//! One handler module per frontend view.

pub mod dashboard;
pub mod historical_data;
pub mod indicators;
pub mod items;
pub mod stocks;

use shared::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

/// The list endpoints answer in two shapes: flat when the caller sent no
/// paging parameters at all, paginated as soon as either one is present.
pub(crate) fn page_selection(
    page: Option<usize>,
    page_size: Option<usize>,
) -> Option<(usize, usize)> {
    if page.is_none() && page_size.is_none() {
        None
    } else {
        Some((
            page.unwrap_or(DEFAULT_PAGE),
            page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        ))
    }
}

/// Splits a comma-separated query value, dropping empty segments.
pub(crate) fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
