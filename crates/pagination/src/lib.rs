//! Page/limit pagination primitives shared by Karigari list endpoints.
//!
//! List handlers accept optional `page` and `limit` query parameters, turn
//! them into a validated [`PageRequest`], and wrap the resulting slice of
//! records in a [`Page`] envelope:
//!
//! ```json
//! { "items": [...], "pagination": { "current": 1, "pages": 3, "total": 25 } }
//! ```
//!
//! # Examples
//!
//! ```
//! use pagination::{Page, PageDefaults, PageRequest};
//!
//! let request = PageRequest::from_query(Some(2), Some(10), PageDefaults::STANDARD)
//!     .expect("valid page request");
//! assert_eq!(request.offset(), 10);
//!
//! let page = Page::new(vec!["a", "b"], request, 12);
//! assert_eq!(page.pagination.pages, 2);
//! ```

use serde::{Deserialize, Serialize};

/// Default and maximum page sizes for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    /// Page size used when the client omits `limit`.
    pub limit: u32,
    /// Largest page size a client may request; larger values are clamped.
    pub max_limit: u32,
}

impl PageDefaults {
    /// Defaults for administrative and per-user listings.
    pub const STANDARD: Self = Self {
        limit: 10,
        max_limit: 100,
    };

    /// Defaults for the public product catalogue.
    pub const CATALOGUE: Self = Self {
        limit: 12,
        max_limit: 100,
    };
}

/// Errors raised while validating page parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one record.
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// Validated page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request from optional query parameters.
    ///
    /// Missing values fall back to page 1 and the endpoint's default limit.
    /// Limits above `defaults.max_limit` are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` or `limit` is zero.
    pub fn from_query(
        page: Option<u32>,
        limit: Option<u32>,
        defaults: PageDefaults,
    ) -> Result<Self, PageRequestError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        let limit = limit.unwrap_or(defaults.limit);
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        Ok(Self {
            page,
            limit: limit.min(defaults.max_limit),
        })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of records on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: PageDefaults::STANDARD.limit,
        }
    }
}

/// Position metadata returned alongside a page of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// One-based number of the returned page.
    pub current: u32,
    /// Total number of pages for the current filter.
    pub pages: u64,
    /// Total number of records matching the current filter.
    pub total: u64,
}

impl PageInfo {
    /// Compute page metadata for `total` matching records.
    #[must_use]
    pub const fn new(request: PageRequest, total: u64) -> Self {
        Self {
            current: request.page,
            pages: total.div_ceil(request.limit as u64),
            total,
        }
    }
}

/// A page of records plus its position metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// Position of this page within the full result set.
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    /// Wrap `items` selected by `request` out of `total` matching records.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            pagination: PageInfo::new(request, total),
        }
    }

    /// Convert each record while keeping the pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page parameter handling.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn missing_values_use_defaults() {
        let request =
            PageRequest::from_query(None, None, PageDefaults::CATALOGUE).expect("defaults apply");
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 12);
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    #[case(Some(0), Some(10), PageRequestError::ZeroPage)]
    #[case(Some(1), Some(0), PageRequestError::ZeroLimit)]
    fn zero_values_are_rejected(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected: PageRequestError,
    ) {
        let err = PageRequest::from_query(page, limit, PageDefaults::STANDARD)
            .expect_err("zero values are invalid");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn oversized_limit_is_clamped() {
        let request = PageRequest::from_query(Some(3), Some(500), PageDefaults::STANDARD)
            .expect("clamped request");
        assert_eq!(request.limit(), 100);
        assert_eq!(request.offset(), 200);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    fn page_count_rounds_up(#[case] total: u64, #[case] pages: u64) {
        let info = PageInfo::new(PageRequest::default(), total);
        assert_eq!(info.pages, pages);
        assert_eq!(info.total, total);
    }

    #[rstest]
    fn envelope_serialises_in_camel_case() {
        let page = Page::new(vec![1_u8, 2], PageRequest::default(), 2).map(u32::from);
        let value = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(
            value,
            serde_json::json!({
                "items": [1, 2],
                "pagination": { "current": 1, "pages": 1, "total": 2 }
            })
        );
    }
}
