//! Storage-independent query model.
//!
//! A [`FilterExpr`] says which rows, a [`Sort`] says in what order and a
//! [`PaginatedRequest`] says which window. All three are generic over an
//! [`EntityField`] enum, so a filter written for one entity cannot name a
//! column of another. Translating them into SQL lives in `repokit-db`.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod canonical;
pub mod error;
pub mod field;
pub mod filter;
pub mod limits;
pub mod list_query;
pub mod pagination;
pub mod sort;
pub mod value;

pub use canonical::{cache_key, canonicalize, create_canonical_json, fingerprint, serialize_to_base64};
pub use error::{QueryError, QueryResult};
pub use field::{EntityField, FieldKind};
pub use filter::{FilterCondition, FilterExpr, FilterGroup, FilterOperator, GroupOperator, ValueShape};
pub use limits::QueryLimits;
pub use list_query::ListQuery;
pub use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, PaginatedRequest, PaginatedResponse};
pub use sort::{NullsOrder, Sort, SortField, SortOrder};
pub use value::{FilterValue, Scalar};
