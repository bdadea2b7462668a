//! Caps on client-supplied query input.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    /// Largest page size a caller may request (default: 100).
    pub max_limit: u64,
    /// Deepest AND/OR nesting (default: 8).
    pub max_filter_depth: usize,
    /// Most leaf conditions in one filter (default: 64).
    pub max_conditions: usize,
    /// Most sort keys (default: 8).
    pub max_sort_fields: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_limit: 100,
            max_filter_depth: 8,
            max_conditions: 64,
            max_sort_fields: 8,
        }
    }
}

impl QueryLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_limit(mut self, max: u64) -> Self {
        self.max_limit = max;
        self
    }

    #[must_use]
    pub fn with_max_filter_depth(mut self, max: usize) -> Self {
        self.max_filter_depth = max;
        self
    }

    #[must_use]
    pub fn with_max_conditions(mut self, max: usize) -> Self {
        self.max_conditions = max;
        self
    }

    #[must_use]
    pub fn with_max_sort_fields(mut self, max: usize) -> Self {
        self.max_sort_fields = max;
        self
    }

    /// # Errors
    ///
    /// [`QueryError::LimitTooLarge`] above `max_limit`.
    pub fn validate_limit(&self, limit: u64) -> QueryResult<()> {
        if limit > self.max_limit {
            return Err(QueryError::LimitTooLarge {
                limit,
                max: self.max_limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = QueryLimits::default();
        assert_eq!(limits.max_limit, 100);
        assert_eq!(limits.max_filter_depth, 8);
        assert_eq!(limits.max_conditions, 64);
        assert_eq!(limits.max_sort_fields, 8);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let limits: QueryLimits = serde_json::from_str(r#"{"max_limit": 25}"#).unwrap();
        assert_eq!(limits.max_limit, 25);
        assert_eq!(limits.max_sort_fields, 8);
    }

    #[test]
    fn validate_limit_boundary() {
        let limits = QueryLimits::new().with_max_limit(50);
        assert!(limits.validate_limit(50).is_ok());
        assert_eq!(
            limits.validate_limit(51),
            Err(QueryError::LimitTooLarge { limit: 51, max: 50 })
        );
    }
}
