//! Pagination and sort primitives shared by room and message listings.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ValidationError;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Creates a page request, rejecting a zero page or page size.
    pub fn new(page: u32, page_size: u32) -> Result<Self, ValidationError> {
        if page < 1 {
            return Err(ValidationError::out_of_range("page", 1, i32::MAX, page as i32));
        }
        if page_size < 1 {
            return Err(ValidationError::out_of_range(
                "page_size",
                1,
                i32::MAX,
                page_size as i32,
            ));
        }
        Ok(Self { page, page_size })
    }

    /// Builds a request from optional query values, applying defaults and
    /// clamping the page size to `max_page_size`.
    pub fn from_query(
        page: Option<u32>,
        page_size: Option<u32>,
        default_page_size: u32,
        max_page_size: u32,
    ) -> Result<Self, ValidationError> {
        let size = page_size.unwrap_or(default_page_size).min(max_page_size);
        Self::new(page.unwrap_or(1), size)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Number of rows to take.
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Wraps a slice of results fetched for `request` out of `total` matches.
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let has_more = request.offset() + (items.len() as u64) < total;
        Self {
            items,
            total,
            page: request.page(),
            page_size: request.page_size(),
            has_more,
        }
    }

    /// Slices an already fully materialised, ordered result set.
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        Self::new(items, total, request)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            has_more: self.has_more,
        }
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ValidationError::invalid_format(
                "sort",
                format!("unknown direction '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_rejects_zero() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
    }

    #[test]
    fn from_query_applies_defaults_and_clamps() {
        let req = PageRequest::from_query(None, None, 10, 100).unwrap();
        assert_eq!((req.page(), req.page_size()), (1, 10));

        let req = PageRequest::from_query(Some(3), Some(500), 10, 100).unwrap();
        assert_eq!(req.page_size(), 100);
        assert_eq!(req.offset(), 200);
    }

    #[test]
    fn from_all_slices_and_reports_more() {
        let req = PageRequest::new(2, 2).unwrap();
        let page = Page::from_all(vec![1, 2, 3, 4, 5], req);

        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.total, 5);
        assert!(page.has_more);

        let last = Page::from_all(vec![1, 2, 3, 4, 5], PageRequest::new(3, 2).unwrap());
        assert_eq!(last.items, vec![5]);
        assert!(!last.has_more);
    }

    #[test]
    fn sort_direction_parses_case_insensitively() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
