//! Page-number pagination shared by all post feeds.

use serde::Serialize;

/// Number of posts per listing page.
pub const PAGE_SIZE: u64 = 10;

/// Parse the `page` query parameter.
///
/// Missing, non-numeric and non-positive values all mean the first page.
/// A number too large for `u64` saturates, so it clamps to the last page.
pub fn parse_page_number(raw: Option<&str>) -> u64 {
    let Some(value) = raw.map(str::trim) else {
        return 1;
    };

    match value.parse::<u64>() {
        Ok(0) => 1,
        Ok(page) => page,
        Err(_) if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => u64::MAX,
        Err(_) => 1,
    }
}

/// Clamp a requested page into `1..=num_pages`.
///
/// An empty listing still has one (empty) page.
pub fn clamp_page(requested: u64, num_pages: u64) -> u64 {
    requested.clamp(1, num_pages.max(1))
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub number: u64,
    pub num_pages: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, num_pages: u64, total_items: u64) -> Self {
        Self {
            items,
            number,
            num_pages: num_pages.max(1),
            total_items,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total_items: self.total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_number() {
        assert_eq!(parse_page_number(None), 1);
        assert_eq!(parse_page_number(Some("")), 1);
        assert_eq!(parse_page_number(Some("abc")), 1);
        assert_eq!(parse_page_number(Some("0")), 1);
        assert_eq!(parse_page_number(Some("-3")), 1);
        assert_eq!(parse_page_number(Some("3")), 3);
        assert_eq!(parse_page_number(Some(" 2 ")), 2);
        assert_eq!(parse_page_number(Some("99999999999999999999999")), u64::MAX);
        assert_eq!(parse_page_number(Some("1e3")), 1);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(1, 0), 1);
        assert_eq!(clamp_page(5, 0), 1);
        assert_eq!(clamp_page(5, 3), 3);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(parse_page_number(Some("99999999999999999999999")), 3), 3);
    }

    #[test]
    fn test_page_navigation() {
        let first = Page::new(vec![1, 2], 1, 3, 25);
        assert!(!first.has_previous());
        assert_eq!(first.next_page_number(), Some(2));

        let last = Page::new(vec![3], 3, 3, 25);
        assert!(!last.has_next());
        assert_eq!(last.previous_page_number(), Some(2));

        let empty: Page<u8> = Page::new(vec![], 1, 0, 0);
        assert_eq!(empty.num_pages, 1);
        assert!(!empty.has_next());
    }
}
