//! Page-number pagination envelope.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::limits::QueryLimits;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

/// 1-indexed page request. Out-of-range values are rejected, never clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaginatedRequest {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl Default for PaginatedRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PaginatedRequest {
    /// # Errors
    ///
    /// [`QueryError::InvalidPage`] or [`QueryError::InvalidLimit`] for zero.
    pub fn new(page: u64, limit: u64) -> QueryResult<Self> {
        let req = Self { page, limit };
        req.validate_bounds()?;
        Ok(req)
    }

    fn validate_bounds(&self) -> QueryResult<()> {
        if self.page < 1 {
            return Err(QueryError::InvalidPage(self.page));
        }
        if self.limit < 1 {
            return Err(QueryError::InvalidLimit(self.limit));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Zero page or limit, or a limit above `limits.max_limit`.
    pub fn validate(&self, limits: &QueryLimits) -> QueryResult<()> {
        self.validate_bounds()?;
        limits.validate_limit(self.limit)
    }

    /// Rows to skip before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// `{ data, total, page, limit, totalPages }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    /// Rows matching the filter, ignoring pagination.
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, request: PaginatedRequest) -> Self {
        let total_pages = if request.limit == 0 {
            0
        } else {
            total.div_ceil(request.limit)
        };
        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
        }
    }

    pub fn empty(request: PaginatedRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
