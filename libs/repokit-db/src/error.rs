use sea_orm::{DbErr, SqlErr};
use tracing::warn;

use repokit::{Operation, RepoError};

/// Maps a storage error onto the repository taxonomy.
///
/// Unique and foreign-key violations become [`RepoError::Conflict`]; every
/// other failure is [`RepoError::DataAccess`] with the original error kept as
/// the source.
#[must_use]
pub fn classify(entity: &'static str, operation: Operation, err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            RepoError::conflict(entity, operation, format!("duplicate value: {detail}"))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => RepoError::conflict(
            entity,
            operation,
            format!("still referenced or missing reference: {detail}"),
        ),
        _ if is_restrict_violation(&err) => RepoError::conflict(
            entity,
            operation,
            format!("still referenced: {err}"),
        ),
        _ => {
            warn!(entity, %operation, error = %err, "storage call failed");
            RepoError::data_access(entity, operation, err)
        }
    }
}

/// SQLite reports an `ON DELETE RESTRICT` hit as extended code 1811, which
/// `sql_err()` does not recognise.
fn is_restrict_violation(err: &DbErr) -> bool {
    err.to_string().contains("FOREIGN KEY constraint failed")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn plain_errors_are_data_access() {
        let err = classify("course", Operation::Find, DbErr::Custom("boom".to_owned()));
        assert_eq!(err.code(), "REPO_DATA_ACCESS");
        assert_eq!(err.to_problem().status.as_u16(), 500);
        assert!(!err.to_problem().detail.contains("boom"));
        assert!(logs_contain("storage call failed"));
    }

    #[test]
    fn sqlite_restrict_failure_is_conflict() {
        let err = DbErr::Exec(RuntimeErr::Internal(
            "error returned from database: (code: 1811) FOREIGN KEY constraint failed".to_owned(),
        ));
        let err = classify("instructor", Operation::Delete, err);
        assert!(matches!(err, RepoError::Conflict { entity: "instructor", .. }), "{err}");
        assert_eq!(err.to_problem().status.as_u16(), 409);
    }
}
