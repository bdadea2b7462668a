use thiserror::Error;

use crate::field::FieldKind;
use crate::filter::{FilterOperator, ValueShape};

/// Rejected query input. Raised before any storage call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("operator `{operator}` on field `{field}` expects {expected}")]
    ValueShape {
        field: String,
        operator: FilterOperator,
        expected: ValueShape,
    },

    #[error("type mismatch for field `{field}`: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        got: String,
    },

    #[error("operator `{operator}` is not supported on field `{field}` of kind {kind}")]
    UnsupportedOperator {
        field: String,
        operator: FilterOperator,
        kind: FieldKind,
    },

    #[error("filter group must contain at least one condition")]
    EmptyGroup,

    #[error("page must be at least 1, got {0}")]
    InvalidPage(u64),

    #[error("limit must be at least 1, got {0}")]
    InvalidLimit(u64),

    #[error("limit {limit} exceeds the maximum of {max}")]
    LimitTooLarge { limit: u64, max: u64 },

    #[error("query too complex: {0}")]
    TooComplex(String),

    #[error("malformed {what}: {message}")]
    Malformed { what: &'static str, message: String },
}

impl QueryError {
    /// Input path the error refers to, when there is one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownField(field)
            | Self::ValueShape { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::UnsupportedOperator { field, .. } => Some(field),
            Self::InvalidPage(_) => Some("page"),
            Self::InvalidLimit(_) | Self::LimitTooLarge { .. } => Some("limit"),
            Self::Malformed { what, .. } => Some(what),
            Self::EmptyGroup | Self::TooComplex(_) => None,
        }
    }

    pub(crate) fn malformed(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Malformed {
            what,
            message: err.to_string(),
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
