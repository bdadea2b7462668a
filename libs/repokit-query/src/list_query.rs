//! Decoding list requests from query strings.

use serde::Deserialize;

use crate::error::{QueryError, QueryResult};
use crate::field::EntityField;
use crate::filter::FilterExpr;
use crate::limits::QueryLimits;
use crate::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, PaginatedRequest};
use crate::sort::Sort;

#[derive(Deserialize)]
struct RawListParams {
    filter: Option<String>,
    sort: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
}

/// `?filter=<json>&sort=<json>&page=N&limit=N`, decoded and validated.
#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery<F: EntityField> {
    pub filter: Option<FilterExpr<F>>,
    pub sort: Sort<F>,
    pub pagination: PaginatedRequest,
}

impl<F: EntityField> Default for ListQuery<F> {
    fn default() -> Self {
        Self {
            filter: None,
            sort: Sort::default(),
            pagination: PaginatedRequest::default(),
        }
    }
}

impl<F: EntityField> ListQuery<F> {
    /// Decodes a URL-encoded query string. A leading `?` is ignored and blank
    /// `filter`/`sort` parameters count as absent.
    ///
    /// # Errors
    ///
    /// [`QueryError::Malformed`] for undecodable input, plus any filter,
    /// sort or pagination validation error.
    pub fn from_query_string(qs: &str, limits: &QueryLimits) -> QueryResult<Self> {
        let qs = qs.strip_prefix('?').unwrap_or(qs);
        let raw: RawListParams =
            serde_urlencoded::from_str(qs).map_err(|e| QueryError::malformed("query string", e))?;

        let filter = raw
            .filter
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(FilterExpr::from_json)
            .transpose()?;

        let sort = raw
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Sort::from_json)
            .transpose()?
            .unwrap_or_default();

        let pagination = PaginatedRequest {
            page: raw.page.unwrap_or(DEFAULT_PAGE),
            limit: raw.limit.unwrap_or(DEFAULT_LIMIT),
        };

        let query = Self {
            filter,
            sort,
            pagination,
        };
        query.validate(limits)?;
        Ok(query)
    }

    /// # Errors
    ///
    /// Any limit violation of the filter, sort or page window.
    pub fn validate(&self, limits: &QueryLimits) -> QueryResult<()> {
        if let Some(filter) = &self.filter {
            filter.validate_limits(limits)?;
        }
        self.sort.validate_limits(limits)?;
        self.pagination.validate(limits)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::filter::FilterCondition;
    use crate::sort::SortField;

    crate::entity_fields! {
        enum UserField {
            Name => ("name", String),
            CreatedAt => ("createdAt", DateTimeUtc),
        }
    }

    fn encode(pairs: &[(&str, &str)]) -> String {
        serde_urlencoded::to_string(pairs).unwrap()
    }

    #[test]
    fn decodes_the_documented_shape() {
        let qs = encode(&[
            ("filter", r#"{"field":"name","operator":"ilike","value":"%smith%"}"#),
            ("sort", r#"[{"field":"createdAt","order":"desc"}]"#),
            ("page", "1"),
            ("limit", "10"),
        ]);
        let q = ListQuery::<UserField>::from_query_string(&format!("?{qs}"), &QueryLimits::default()).unwrap();

        assert_eq!(
            q.filter,
            Some(FilterCondition::ilike(UserField::Name, "%smith%").unwrap().into())
        );
        assert_eq!(q.sort, Sort::by(SortField::desc(UserField::CreatedAt)));
        assert_eq!(q.pagination, PaginatedRequest { page: 1, limit: 10 });
    }

    #[test]
    fn empty_query_string_uses_defaults() {
        let q = ListQuery::<UserField>::from_query_string("", &QueryLimits::default()).unwrap();
        assert_eq!(q, ListQuery::default());
    }

    #[test]
    fn invalid_pieces_are_reported() {
        let limits = QueryLimits::default();
        assert!(matches!(
            ListQuery::<UserField>::from_query_string("page=abc", &limits),
            Err(QueryError::Malformed { what: "query string", .. })
        ));
        assert_eq!(
            ListQuery::<UserField>::from_query_string("page=0", &limits),
            Err(QueryError::InvalidPage(0))
        );
        assert!(matches!(
            ListQuery::<UserField>::from_query_string(&encode(&[("filter", "{")]), &limits),
            Err(QueryError::Malformed { what: "filter", .. })
        ));
    }
}
