// ── Pagination ──

use serde::Serialize;

/// Deals per grid page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// One 1-indexed page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice out page `page` (1-indexed) of `per_page` items.
///
/// Page 0 is treated as page 1 and a zero page size as the default. Pages
/// past the end are empty.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = if per_page == 0 { DEFAULT_PAGE_SIZE } else { per_page };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page);
    let items: Vec<T> = items.into_iter().skip(start).take(per_page).collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_sizes_follow_the_formula() {
        let items: Vec<u32> = (0..30).collect();
        for n in 1..=4 {
            let expected = 12_usize.min(30_usize.saturating_sub((n - 1) * 12));
            assert_eq!(paginate(items.clone(), n, 12).items.len(), expected);
        }
    }

    #[test]
    fn pages_reconstruct_the_input_exactly_once() {
        let items: Vec<u32> = (0..25).collect();
        let first = paginate(items.clone(), 1, 12);
        let total_pages = first.total_pages;
        assert_eq!(total_pages, 3);

        let rebuilt: Vec<u32> = (1..=total_pages)
            .flat_map(|n| paginate(items.clone(), n, 12).items)
            .collect();
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn page_zero_is_page_one_and_overflow_is_empty() {
        let items: Vec<u32> = (0..5).collect();
        let zero = paginate(items.clone(), 0, 12);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.items.len(), 5);
        assert!(!zero.has_next());
        assert!(!zero.has_prev());

        let past = paginate(items, 9, 12);
        assert!(past.is_empty());
        assert_eq!(past.total_items, 5);
    }

    #[test]
    fn empty_input_has_no_pages() {
        let page = paginate(Vec::<u32>::new(), 1, 12);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
    }
}
