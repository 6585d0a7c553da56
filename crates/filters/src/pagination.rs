// In crates/filters/src/pagination.rs

use core_types::PaginationMeta;

/// Page navigation against a known number of pages.
///
/// Out-of-range requests are ignored rather than clamped; `next_page` and
/// `prev_page` stop at the bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationController {
    initial_page: u32,
    initial_page_size: u32,
    page: u32,
    page_size: u32,
    total_pages: u32,
}

impl PaginationController {
    pub fn new(initial_page: u32, initial_page_size: u32, total_pages: u32) -> Self {
        Self {
            initial_page,
            initial_page_size,
            page: initial_page,
            page_size: initial_page_size,
            total_pages,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Moves to `page` if it lies in `1..=total_pages`. Returns whether it moved.
    pub fn set_page(&mut self, page: u32) -> bool {
        if (1..=self.total_pages).contains(&page) {
            self.page = page;
            true
        } else {
            tracing::trace!(page, total_pages = self.total_pages, "Ignoring out-of-range page");
            false
        }
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Always accepted; returns to the first page.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Restores the page and page size given at construction.
    pub fn reset(&mut self) {
        self.page = self.initial_page;
        self.page_size = self.initial_page_size;
    }

    /// Updates the bound once a list response arrives. The current page is left alone.
    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
    }

    pub fn apply_meta(&mut self, meta: &PaginationMeta) {
        self.set_total_pages(meta.total_pages);
    }

    /// Zero-based index of the first item on the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn is_first_page(&self) -> bool {
        self.page <= 1
    }

    pub fn is_last_page(&self) -> bool {
        self.page >= self.total_pages
    }

    /// "Page 2 of 7". An empty result still reads "of 1".
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_page_outside_bounds_is_ignored() {
        let mut pager = PaginationController::new(2, 25, 5);
        assert!(!pager.set_page(0));
        assert!(!pager.set_page(6));
        assert_eq!(pager.page(), 2);
        assert!(pager.set_page(5));
        assert!(pager.is_last_page());
    }

    #[test]
    fn next_and_prev_stop_at_the_ends() {
        let mut pager = PaginationController::new(1, 25, 2);
        pager.prev_page();
        assert_eq!(pager.page(), 1);
        pager.next_page();
        pager.next_page();
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn page_size_change_returns_to_first_page() {
        let mut pager = PaginationController::new(3, 25, 10);
        pager.set_page_size(100);
        assert_eq!((pager.page(), pager.page_size(), pager.offset()), (1, 100, 0));
    }

    #[test]
    fn reset_uses_the_construction_snapshot() {
        let mut pager = PaginationController::new(2, 10, 10);
        pager.set_page_size(50);
        pager.set_page(4);
        pager.reset();
        assert_eq!((pager.page(), pager.page_size()), (2, 10));
        assert_eq!(pager.offset(), 10);
    }

    #[test]
    fn no_pages_means_first_and_last() {
        let mut pager = PaginationController::new(1, 25, 0);
        assert!(pager.is_first_page());
        assert!(pager.is_last_page());
        pager.next_page();
        assert!(!pager.set_page(1));
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.page_label(), "Page 1 of 1");
    }

    #[test]
    fn meta_updates_the_bound() {
        let mut pager = PaginationController::new(1, 25, 1);
        pager.apply_meta(&PaginationMeta { page: 1, per_page: 25, total: 130, total_pages: 6 });
        assert!(pager.set_page(6));
        assert_eq!(pager.page_label(), "Page 6 of 6");
        assert_eq!(pager.offset(), 125);
    }
}
