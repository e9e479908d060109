use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `?page=&limit=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn request(&self) -> PageRequest {
        PageRequest::from_page(self.page, self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: i64,
    pub take: i64,
}

impl PageRequest {
    /// 1-based `page` with `limit` rows per page; both fall back to defaults.
    pub fn from_page(page: Option<i64>, limit: Option<i64>) -> Self {
        let take = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = page.unwrap_or(1).max(1);
        Self {
            skip: (page - 1).saturating_mul(take),
            take,
        }
    }

    pub fn from_skip_take(skip: i64, take: i64) -> Self {
        Self {
            skip: skip.max(0),
            take: take.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> i64 {
        self.skip / self.take + 1
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.take - 1) / self.take
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            total_pages: request.total_pages(total),
        }
    }

    /// Renders as `{ <key>: [...], total, page, totalPages }`.
    pub fn to_json(&self, key: &str) -> Value {
        let mut body = json!({
            "total": self.total,
            "page": self.page,
            "totalPages": self.total_pages,
        });
        body[key] = json!(self.items);
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_page_from_skip_and_take() {
        let request = PageRequest::from_skip_take(20, 10);
        assert_eq!(request.page(), 3);
        assert_eq!(request.total_pages(100), 10);

        let request = PageRequest::from_skip_take(40, 20);
        assert_eq!(request.page(), 3);
        assert_eq!(request.total_pages(55), 3);
    }

    #[test]
    fn page_defaults_and_bounds() {
        assert_eq!(
            PageRequest::from_page(None, None),
            PageRequest { skip: 0, take: 20 }
        );
        assert_eq!(
            PageRequest::from_page(Some(0), Some(1000)),
            PageRequest { skip: 0, take: 100 }
        );
        assert_eq!(
            PageRequest::from_page(Some(4), Some(25)),
            PageRequest { skip: 75, take: 25 }
        );
    }

    #[test]
    fn huge_page_number_saturates_instead_of_overflowing() {
        let request = PageRequest::from_page(Some(i64::MAX), Some(20));
        assert_eq!(request.take, 20);
        assert_eq!(request.skip, i64::MAX);
        assert!(request.page() > 0);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page = Paginated::<i32>::new(Vec::new(), 0, PageRequest::from_page(None, None));
        assert_eq!(
            page.to_json("persons"),
            json!({ "persons": [], "total": 0, "page": 1, "totalPages": 0 })
        );
    }
}
