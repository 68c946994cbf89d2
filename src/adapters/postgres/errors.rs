//! Mapping of sqlx failures onto domain errors.

use crate::domain::foundation::{DomainError, ErrorCode};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Wraps a storage failure. Unique-constraint violations become `Conflict`
/// so callers can retry a lost insert race.
pub(super) fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return DomainError::new(
                ErrorCode::Conflict,
                format!("{}: {}", context, db_err.message()),
            );
        }
    }
    DomainError::database(context, err)
}

/// True if the error is a foreign key violation, i.e. a referenced row is missing.
pub(super) fn is_missing_reference(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_database_failures() {
        let err = db_error("Failed to load room", sqlx::Error::RowNotFound);
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.starts_with("Failed to load room"));
        assert!(!is_missing_reference(&sqlx::Error::PoolTimedOut));
    }
}
