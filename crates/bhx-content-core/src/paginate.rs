//! Page slicing for the blog listing.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of results plus the numbers needed to render pager links.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually served (after clamping).
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice `items` into page `requested` of `page_size`.
///
/// The requested page is clamped into `1..=total_pages`; an empty list still
/// has one (empty) page. A `page_size` of zero is treated as one.
pub fn paginate<T: Clone>(items: &[T], requested: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = requested.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total_items,
    }
}

/// Parse a `?page=` query value the forgiving way: anything missing or
/// unparseable means page 1.
pub fn parse_page_param(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 1, 10);
        assert_eq!(page.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 25);
    }

    #[test]
    fn test_last_partial_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(paginate(&items, 9, 2).page, 3);
        assert_eq!(paginate(&items, 0, 2).page, 1);
    }

    #[test]
    fn test_empty_has_one_page() {
        let page = paginate::<u32>(&[], 4, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_parse_page_param() {
        assert_eq!(parse_page_param(None), 1);
        assert_eq!(parse_page_param(Some("3")), 3);
        assert_eq!(parse_page_param(Some("0")), 1);
        assert_eq!(parse_page_param(Some("abc")), 1);
        assert_eq!(parse_page_param(Some("-2")), 1);
    }
}
