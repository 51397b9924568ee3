//! Page/limit pagination primitives shared by list endpoints.
//!
//! Endpoints accept `page` and `limit` query parameters, fall back to
//! defaults when a parameter is absent, and reject out-of-range values
//! before any storage round trip. The [`PageEnvelope`] carries the page of
//! items together with the totals clients need to render pagination
//! controls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page number used when the client omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the client omits `limit`.
pub const DEFAULT_LIMIT: u32 = 10;
/// Upper bound on the page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Validation errors returned when constructing a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageValidationError {
    /// `page` was zero or negative.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// `limit` was outside `1..=MAX_LIMIT`.
    #[error("limit must be between 1 and {MAX_LIMIT}")]
    LimitOutOfRange,
}

/// Validated pagination window.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= MAX_LIMIT`
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(2, 25).expect("valid window");
/// assert_eq!(request.offset(), 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Construct a validated request from explicit values.
    ///
    /// # Errors
    /// Returns [`PageValidationError`] when either bound is out of range.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageValidationError> {
        if page < 1 {
            return Err(PageValidationError::PageOutOfRange);
        }
        if limit < 1 || limit > MAX_LIMIT {
            return Err(PageValidationError::LimitOutOfRange);
        }
        Ok(Self { page, limit })
    }

    /// Construct a request from raw query values, applying defaults for
    /// absent parameters.
    ///
    /// Values arrive as `i64` so that negative query input can be rejected
    /// here rather than at the deserializer boundary.
    ///
    /// # Errors
    /// Returns [`PageValidationError`] when a provided value is out of range.
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Result<Self, PageValidationError> {
        let page = match page {
            None => DEFAULT_PAGE,
            Some(raw) => {
                u32::try_from(raw).map_err(|_| PageValidationError::PageOutOfRange)?
            }
        };
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(raw) => {
                u32::try_from(raw).map_err(|_| PageValidationError::LimitOutOfRange)?
            }
        };
        Self::new(page, limit)
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items in the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the totals needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEnvelope<T> {
    /// Items on this page, at most `limit` of them.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: u64,
    /// The page these items belong to.
    pub current_page: u32,
    /// Number of pages needed to cover `total` items.
    pub total_pages: u64,
}

impl<T> PageEnvelope<T> {
    /// Assemble an envelope from a page of items and the overall total.
    ///
    /// `total_pages` is the ceiling of `total / limit`; an empty collection
    /// yields zero pages, matching the behaviour clients already rely on.
    #[must_use]
    pub fn assemble(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let total_pages = total.div_ceil(u64::from(request.limit()));
        Self {
            items,
            total,
            current_page: request.page(),
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this crate.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(3), None, 3, 10)]
    #[case(None, Some(50), 1, 50)]
    #[case(Some(2), Some(100), 2, 100)]
    fn from_query_applies_defaults(
        #[case] page: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let request = PageRequest::from_query(page, limit).expect("valid query");
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.limit(), expected_limit);
    }

    #[rstest]
    #[case(Some(0), None, PageValidationError::PageOutOfRange)]
    #[case(Some(-1), None, PageValidationError::PageOutOfRange)]
    #[case(None, Some(0), PageValidationError::LimitOutOfRange)]
    #[case(None, Some(-5), PageValidationError::LimitOutOfRange)]
    #[case(None, Some(101), PageValidationError::LimitOutOfRange)]
    fn from_query_rejects_out_of_range(
        #[case] page: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] expected: PageValidationError,
    ) {
        let err = PageRequest::from_query(page, limit).expect_err("out of range");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case(1, 10, 0)]
    #[case(2, 10, 10)]
    #[case(5, 25, 100)]
    fn offset_skips_previous_pages(#[case] page: u32, #[case] limit: u32, #[case] expected: i64) {
        let request = PageRequest::new(page, limit).expect("valid window");
        assert_eq!(request.offset(), expected);
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(95, 10, 10)]
    fn assemble_computes_total_pages(
        #[case] total: u64,
        #[case] limit: u32,
        #[case] expected_pages: u64,
    ) {
        let request = PageRequest::new(1, limit).expect("valid window");
        let envelope = PageEnvelope::<u8>::assemble(Vec::new(), total, request);
        assert_eq!(envelope.total_pages, expected_pages);
        assert_eq!(envelope.current_page, 1);
        assert_eq!(envelope.total, total);
    }
}
