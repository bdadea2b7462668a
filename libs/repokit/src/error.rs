//! Repository error taxonomy.

use std::fmt;

use repokit_errors::{Problem, ValidationViolation};
use repokit_query::QueryError;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Storage operation an error happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Find,
    Count,
    Insert,
    Update,
    Delete,
    Load,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Find => "find",
            Operation::Count => "count",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Load => "load",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum RepoError {
    /// Bad filter, sort, pagination or load options. Raised before storage is touched.
    #[error("validation failed: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Unique or foreign-key constraint violation reported by storage.
    #[error("conflict during {operation} of {entity}: {message}")]
    Conflict {
        entity: &'static str,
        operation: Operation,
        message: String,
    },

    #[error("data access failed during {operation} of {entity}: {source}")]
    DataAccess {
        entity: &'static str,
        operation: Operation,
        #[source]
        source: BoxError,
    },
}

pub type RepoResult<T> = Result<T, RepoError>;

impl From<QueryError> for RepoError {
    fn from(e: QueryError) -> Self {
        RepoError::Validation {
            field: e.field().map(ToOwned::to_owned),
            message: e.to_string(),
        }
    }
}

impl RepoError {
    pub fn validation(message: impl Into<String>) -> Self {
        RepoError::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        RepoError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        RepoError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, operation: Operation, message: impl Into<String>) -> Self {
        RepoError::Conflict {
            entity,
            operation,
            message: message.into(),
        }
    }

    pub fn data_access(
        entity: &'static str,
        operation: Operation,
        source: impl Into<BoxError>,
    ) -> Self {
        RepoError::DataAccess {
            entity,
            operation,
            source: source.into(),
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            RepoError::Validation { .. } => "REPO_VALIDATION",
            RepoError::NotFound { .. } => "REPO_NOT_FOUND",
            RepoError::Conflict { .. } => "REPO_CONFLICT",
            RepoError::DataAccess { .. } => "REPO_DATA_ACCESS",
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepoError::Conflict { .. })
    }

    /// Boundary shape. Storage details of `DataAccess` stay out of the detail text.
    pub fn to_problem(&self) -> Problem {
        let problem = match self {
            RepoError::Validation { field, message } => {
                let p = Problem::bad_request(message.clone());
                match field {
                    Some(field) => p.with_errors(vec![ValidationViolation {
                        field: field.clone(),
                        message: message.clone(),
                        code: None,
                    }]),
                    None => p,
                }
            }
            RepoError::NotFound { .. } => Problem::not_found(self.to_string()),
            RepoError::Conflict { .. } => Problem::conflict(self.to_string()),
            RepoError::DataAccess {
                entity, operation, ..
            } => Problem::internal(format!("{operation} of {entity} failed")),
        };
        problem.with_code(self.code())
    }
}
