use serde::{Deserialize, Serialize};
use validator::Validate;

/// One page of results plus the paging metadata clients need to walk
/// the full set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        let total_pages = if size > 0 { (total_elements + size - 1) / size } else { 0 };
        Self { items, page, size, total_elements, total_pages }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub page: i64,
    #[serde(default = "default_size")]
    #[validate(range(min = 1, max = 100))]
    pub size: i64,
    pub sort: Option<String>,
}

fn default_size() -> i64 {
    10
}

impl PageQuery {
    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3], 0, 10, 21);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn total_pages_exact_division() {
        let page: Page<i32> = Page::new(vec![], 1, 10, 20);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page: Page<i32> = Page::new(vec![], 0, 10, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn offset_is_page_times_size() {
        let q = PageQuery { page: 3, size: 25, sort: None };
        assert_eq!(q.offset(), 75);
    }
}
